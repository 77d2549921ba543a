//! Helpers shared by the integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use noriba_core::GtfsStore;
use tempfile::TempDir;

/// Temporary feed directory removed on drop.
pub struct FeedDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl FeedDir {
    /// Create an empty feed directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("failed to create feed dir: {err}"));
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temporary path {path:?} is not UTF-8"));
        Self { _dir: dir, path }
    }

    /// Write one feed file, replacing any previous contents.
    pub fn write(&self, file_name: &str, contents: &str) {
        let target = self.path.join(file_name);
        std::fs::write(&target, contents)
            .unwrap_or_else(|err| panic!("failed to write {target}: {err}"));
    }

    /// Directory holding the feed files.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Number of rows in `table`.
pub fn count_rows(store: &GtfsStore, table: &str) -> i64 {
    store
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .unwrap_or_else(|err| panic!("failed to count rows in {table}: {err}"))
}

/// Every row of `table` in insertion order, columns joined with `|`.
pub fn dump_rows(store: &GtfsStore, table: &str, columns: &[&str]) -> Vec<String> {
    let selected = columns
        .iter()
        .map(|column| format!("COALESCE(\"{column}\", '<null>')"))
        .collect::<Vec<_>>()
        .join(" || '|' || ");
    let sql = format!("SELECT {selected} FROM \"{table}\" ORDER BY rowid");
    let mut statement = store
        .connection()
        .prepare(&sql)
        .unwrap_or_else(|err| panic!("failed to prepare dump of {table}: {err}"));
    let rows = statement
        .query_map([], |row| row.get::<_, String>(0))
        .and_then(Iterator::collect::<Result<Vec<_>, _>>)
        .unwrap_or_else(|err| panic!("failed to dump {table}: {err}"));
    rows
}
