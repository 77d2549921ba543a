//! Test helpers for building feed directories and reading CLI output.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 tempdir");
        Self { _dir: dir, root }
    }

    /// Feed directory holding a small two-stop feed.
    pub(super) fn feed(&self) -> Utf8PathBuf {
        let feed = self.root.join("feed");
        fs::create_dir_all(&feed).expect("create feed dir");
        for (name, contents) in [
            ("agency.txt", "agency_id,agency_name\nA1,Test Railway\n"),
            (
                "agency_jp.txt",
                "agency_id,agency_zip_number,agency_president_name\nA1,1000001,Taro\n",
            ),
            ("stops.txt", "stop_id,stop_name\nS1,東京\nS2,大阪\n"),
            (
                "translations.txt",
                "trans_id,lang,translation\n東京,kana,トウキョウ\n東京,en,Tokyo\n",
            ),
            ("stop_times.txt", "trip_id,stop_id\nT1,S1\nT1,S1\nT2,S1\n"),
        ] {
            fs::write(feed.join(name), contents).expect("write feed file");
        }
        feed
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}

pub(super) fn output(bytes: Vec<u8>) -> serde_json::Value {
    let text = String::from_utf8(bytes).expect("UTF-8 output");
    assert!(text.ends_with("}\n"), "output should end with a newline: {text:?}");
    serde_json::from_str(&text).expect("JSON output")
}
