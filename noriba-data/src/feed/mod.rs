//! Reading delimited feed files into field maps.
//!
//! Each call to [`read_feed_file`] decodes the file anew, sniffs its dialect
//! from the first [`SAMPLE_CHARS`] characters and parses it with the `csv`
//! crate. Rows stream lazily in file order unless duplicate removal is
//! requested, in which case the whole file is materialised, sorted by a
//! canonical serialisation and deduplicated. The variant of [`FeedRows`] tells
//! callers which ordering they received.

use std::{collections::BTreeMap, io::Cursor, vec};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

mod dialect;
mod encoding;

pub use dialect::{CANDIDATE_DELIMITERS, Dialect, SAMPLE_CHARS};
pub use encoding::FeedEncoding;

/// Errors raised while reading a feed file.
#[derive(Debug, Error)]
pub enum FeedReadError {
    /// The file could not be read from disk.
    #[error("failed to read feed file {path}: {source}")]
    Io {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not valid in the requested encoding.
    #[error("{path} is not valid {encoding}")]
    Encoding {
        /// File being read.
        path: Utf8PathBuf,
        /// Name of the encoding used to decode.
        encoding: &'static str,
    },
    /// The encoding label is not recognised.
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding {
        /// Label supplied by the caller.
        label: String,
    },
    /// No candidate delimiter split the sample consistently.
    #[error("could not determine the delimiter of {path}")]
    UndeterminedDialect {
        /// File being read.
        path: Utf8PathBuf,
    },
    /// A row carries more values than the header names.
    #[error("{path}:{line}: expected at most {expected} fields but found {found}")]
    MalformedRow {
        /// File being read.
        path: Utf8PathBuf,
        /// One-based line number of the row.
        line: u64,
        /// Number of header fields.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },
    /// The `csv` parser rejected the input.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being read.
        path: Utf8PathBuf,
        /// Parser failure.
        #[source]
        source: csv::Error,
    },
    /// A row could not be serialised for duplicate detection.
    #[error("failed to serialise a row of {path} for duplicate detection")]
    Canonical {
        /// File being read.
        path: Utf8PathBuf,
        /// Serialisation failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Options controlling one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReadOptions {
    /// Field names to use instead of the header row.
    ///
    /// When set, the first row is data rather than a header.
    pub field_names: Option<Vec<String>>,
    /// Encoding used to decode the file.
    pub encoding: FeedEncoding,
    /// Drop exact duplicate rows, returning them in canonical sorted order.
    pub drop_duplicates: bool,
}

impl FeedReadOptions {
    /// Use `encoding` to decode the file.
    #[must_use]
    pub fn with_encoding(mut self, encoding: FeedEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Supply field names instead of reading them from the header row.
    #[must_use]
    pub fn with_field_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Toggle duplicate removal.
    #[must_use]
    pub fn with_drop_duplicates(mut self, drop_duplicates: bool) -> Self {
        self.drop_duplicates = drop_duplicates;
        self
    }
}

/// One parsed row: field name to raw value.
///
/// A field is `None` when the row was shorter than the header. Empty strings
/// are kept as they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRow {
    fields: BTreeMap<String, Option<String>>,
}

impl FeedRow {
    /// Raw value of a field, `None` when the field is absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Option::as_deref)
    }

    /// Iterate fields in lexical name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of fields, present or absent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Order-independent JSON form with keys in lexical order.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }

    fn insert(&mut self, name: &str, value: Option<&str>) {
        self.fields
            .insert(name.to_owned(), value.map(str::to_owned));
    }
}

impl<K, V> FromIterator<(K, V)> for FeedRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), Some(value.into())))
                .collect(),
        }
    }
}

/// Rows of one feed file.
///
/// Both variants are finite and single-pass; read the file again to restart.
#[derive(Debug)]
pub enum FeedRows {
    /// Lazily parsed rows in file order.
    Streaming(StreamingRows),
    /// Fully materialised rows, deduplicated and in canonical sorted order.
    Sorted(SortedRows),
}

impl FeedRows {
    /// Field names used for the rows.
    #[must_use]
    pub fn header(&self) -> &[String] {
        match self {
            Self::Streaming(rows) => &rows.header,
            Self::Sorted(rows) => &rows.header,
        }
    }

    /// Whether rows were deduplicated and reordered into canonical order.
    #[must_use]
    pub fn is_deduplicated(&self) -> bool {
        matches!(self, Self::Sorted(_))
    }
}

impl Iterator for FeedRows {
    type Item = Result<FeedRow, FeedReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Streaming(rows) => rows.next(),
            Self::Sorted(rows) => rows.rows.next().map(Ok),
        }
    }
}

/// Rows parsed on demand in file order.
pub struct StreamingRows {
    path: Utf8PathBuf,
    header: Vec<String>,
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for StreamingRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingRows")
            .field("path", &self.path)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl StreamingRows {
    fn to_row(&self, record: &csv::StringRecord) -> Result<Option<FeedRow>, FeedReadError> {
        if record.iter().all(|value| value.trim().is_empty()) {
            return Ok(None);
        }
        let found = record.len();
        let expected = self.header.len();
        // Trailing empty values beyond the header are tolerated.
        if found > expected && record.iter().skip(expected).any(|value| !value.is_empty()) {
            return Err(FeedReadError::MalformedRow {
                path: self.path.clone(),
                line: record.position().map_or(0, csv::Position::line),
                expected,
                found,
            });
        }
        let mut row = FeedRow::default();
        for (index, name) in self.header.iter().enumerate() {
            row.insert(name, record.get(index));
        }
        Ok(Some(row))
    }
}

impl Iterator for StreamingRows {
    type Item = Result<FeedRow, FeedReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(source) => {
                    return Some(Err(FeedReadError::Parse {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            match self.to_row(&record) {
                Ok(Some(row)) => return Some(Ok(row)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Deduplicated rows in canonical order.
#[derive(Debug)]
pub struct SortedRows {
    header: Vec<String>,
    rows: vec::IntoIter<FeedRow>,
}

impl SortedRows {
    /// Number of rows left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }
}

/// Read one feed file.
///
/// # Errors
/// Fails when the file cannot be read or decoded, when its dialect cannot be
/// determined, and (for deduplicated reads) when any row is malformed. In
/// streaming mode, row-level failures surface as items of the iterator.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use noriba_data::feed::{FeedReadOptions, read_feed_file};
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = Utf8PathBuf::from_path_buf(dir.path().join("agency.txt")).expect("UTF-8 path");
/// std::fs::write(&path, "agency_id,agency_name\nA1,Test Railway\n").expect("write feed");
///
/// let rows: Vec<_> = read_feed_file(&path, &FeedReadOptions::default())
///     .expect("open feed")
///     .collect::<Result<_, _>>()
///     .expect("parse rows");
/// assert_eq!(rows[0].get("agency_name"), Some("Test Railway"));
/// ```
pub fn read_feed_file(
    path: &Utf8Path,
    options: &FeedReadOptions,
) -> Result<FeedRows, FeedReadError> {
    let bytes = noriba_fs::read_bytes(path).map_err(|source| FeedReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = options
        .encoding
        .decode(&bytes)
        .ok_or_else(|| FeedReadError::Encoding {
            path: path.to_path_buf(),
            encoding: options.encoding.name(),
        })?
        .into_owned();

    let dialect = Dialect::sniff(&text).ok_or_else(|| FeedReadError::UndeterminedDialect {
        path: path.to_path_buf(),
    })?;
    debug!(
        "{path}: delimiter {:?}, quote {:?}",
        dialect.delimiter, dialect.quote
    );

    let text = dialect.skip_initial_space(&text);
    let streaming = open_streaming(path, text, dialect, options.field_names.as_deref())?;
    if options.drop_duplicates {
        sort_unique(path, streaming).map(FeedRows::Sorted)
    } else {
        Ok(FeedRows::Streaming(streaming))
    }
}

fn open_streaming(
    path: &Utf8Path,
    text: String,
    dialect: Dialect,
    field_names: Option<&[String]>,
) -> Result<StreamingRows, FeedReadError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(ascii_byte(dialect.delimiter))
        .quote(ascii_byte(dialect.quote))
        .from_reader(Cursor::new(text.into_bytes()));
    let mut records = reader.into_records();

    let header = match field_names {
        Some(names) => names.to_vec(),
        None => read_header(path, &mut records)?,
    };
    Ok(StreamingRows {
        path: path.to_path_buf(),
        header,
        records,
    })
}

fn read_header(
    path: &Utf8Path,
    records: &mut csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
) -> Result<Vec<String>, FeedReadError> {
    for record in records {
        let record = record.map_err(|source| FeedReadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        return Ok(record.iter().map(str::to_owned).collect());
    }
    Ok(Vec::new())
}

fn sort_unique(path: &Utf8Path, rows: StreamingRows) -> Result<SortedRows, FeedReadError> {
    let header = rows.header.clone();
    let mut keyed = Vec::new();
    for row in rows {
        let row = row?;
        let key = row
            .canonical_json()
            .map_err(|source| FeedReadError::Canonical {
                path: path.to_path_buf(),
                source,
            })?;
        keyed.push((key, row));
    }
    keyed.sort_by(|(left, _), (right, _)| left.cmp(right));

    let mut unique: Vec<FeedRow> = Vec::with_capacity(keyed.len());
    for (_, row) in keyed {
        if unique.last() != Some(&row) {
            unique.push(row);
        }
    }
    debug!("{path}: {} distinct rows after deduplication", unique.len());
    Ok(SortedRows {
        header,
        rows: unique.into_iter(),
    })
}

fn ascii_byte(ch: char) -> u8 {
    u8::try_from(ch).unwrap_or(b',')
}

#[cfg(test)]
mod tests;
