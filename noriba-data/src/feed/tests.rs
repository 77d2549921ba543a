//! Unit tests for feed file reading.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct FeedFile {
    _dir: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn feed_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

fn write_feed(dir: TempDir, contents: &[u8]) -> FeedFile {
    let path = Utf8PathBuf::from_path_buf(dir.path().join("feed.txt")).expect("UTF-8 temp path");
    std::fs::write(&path, contents).expect("write feed file");
    FeedFile { _dir: dir, path }
}

fn read_all(file: &FeedFile, options: &FeedReadOptions) -> Vec<FeedRow> {
    read_feed_file(&file.path, options)
        .expect("open feed file")
        .collect::<Result<_, _>>()
        .expect("parse rows")
}

#[rstest]
fn streams_rows_in_file_order(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id,stop_name\nS2,Osaka\nS1,Tokyo\n");
    let rows = read_feed_file(&file.path, &FeedReadOptions::default()).expect("open feed");
    assert!(!rows.is_deduplicated());
    assert_eq!(rows.header(), ["stop_id", "stop_name"]);
    let ids: Vec<String> = rows
        .map(|row| row.expect("row").get("stop_id").expect("id").to_owned())
        .collect();
    assert_eq!(ids, ["S2", "S1"]);
}

#[rstest]
fn strips_bom_and_initial_space(feed_dir: TempDir) {
    let file = write_feed(
        feed_dir,
        "\u{feff}agency_id, agency_name\nA1, Test Railway\n".as_bytes(),
    );
    let rows = read_all(&file, &FeedReadOptions::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("agency_id"), Some("A1"));
    assert_eq!(rows[0].get("agency_name"), Some("Test Railway"));
}

#[rstest]
#[case(b"stop_id,stop_name\nS1,\"  Tokyo\"\n".as_slice(), "S1", "  Tokyo")]
#[case(b"stop_id,stop_name\nS1,  \"  Tokyo\"\n".as_slice(), "S1", "  Tokyo")]
#[case(b" stop_id,stop_name\n S1,\tTokyo\n".as_slice(), " S1", "\tTokyo")]
fn keeps_leading_whitespace_that_is_not_after_a_delimiter(
    feed_dir: TempDir,
    #[case] contents: &[u8],
    #[case] id: &str,
    #[case] name: &str,
) {
    let file = write_feed(feed_dir, contents);
    let rows = read_all(&file, &FeedReadOptions::default());
    let id_field = rows[0].fields().next().map(|(_, value)| value);
    assert_eq!(id_field, Some(Some(id)));
    assert_eq!(rows[0].get("stop_name"), Some(name));
}

#[rstest]
fn keeps_quoted_delimiters_and_empty_values(feed_dir: TempDir) {
    let file = write_feed(
        feed_dir,
        b"stop_id,stop_name,stop_desc\nS1,\"Tokyo, Marunouchi\",\n",
    );
    let rows = read_all(&file, &FeedReadOptions::default());
    assert_eq!(rows[0].get("stop_name"), Some("Tokyo, Marunouchi"));
    assert_eq!(rows[0].get("stop_desc"), Some(""));
}

#[rstest]
fn short_rows_have_absent_fields(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id,stop_name,stop_desc\nS1,Tokyo\n");
    let rows = read_all(&file, &FeedReadOptions::default());
    assert_eq!(rows[0].get("stop_desc"), None);
    assert_eq!(rows[0].len(), 3);
}

#[rstest]
fn long_rows_are_malformed(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id,stop_name\nS1,Tokyo\nS2,Osaka,extra\n");
    let results: Vec<_> = read_feed_file(&file.path, &FeedReadOptions::default())
        .expect("open feed")
        .collect();
    assert!(results[0].is_ok());
    let Err(FeedReadError::MalformedRow {
        line,
        expected,
        found,
        ..
    }) = &results[1]
    else {
        panic!("expected a malformed row, got {:?}", results[1]);
    };
    assert_eq!((*line, *expected, *found), (3, 2, 3));
}

#[rstest]
fn trailing_empty_values_are_tolerated(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id,stop_name\nS1,Tokyo,\n");
    let rows = read_all(&file, &FeedReadOptions::default());
    assert_eq!(rows[0].get("stop_name"), Some("Tokyo"));
}

#[rstest]
fn skips_blank_lines(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id\n\nS1\n\nS2\n");
    assert_eq!(read_all(&file, &FeedReadOptions::default()).len(), 2);
}

#[rstest]
fn reads_tab_separated_files(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"trip_id\tstop_id\nT1\tS1\n");
    let rows = read_all(&file, &FeedReadOptions::default());
    assert_eq!(rows[0].get("stop_id"), Some("S1"));
}

#[rstest]
fn explicit_field_names_treat_first_row_as_data(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"S1,Tokyo\nS2,Osaka\n");
    let options = FeedReadOptions::default().with_field_names(["stop_id", "stop_name"]);
    let rows = read_all(&file, &options);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("stop_name"), Some("Tokyo"));
}

#[rstest]
fn dedup_sorts_and_collapses_duplicates(feed_dir: TempDir) {
    let file = write_feed(
        feed_dir,
        b"stop_id,stop_name\nS2,Osaka\nS1,Tokyo\nS2,Osaka\nS2,Osaka\n",
    );
    let options = FeedReadOptions::default().with_drop_duplicates(true);
    let rows = read_feed_file(&file.path, &options).expect("open feed");
    assert!(rows.is_deduplicated());
    let ids: Vec<String> = rows
        .map(|row| row.expect("row").get("stop_id").expect("id").to_owned())
        .collect();
    assert_eq!(ids, ["S1", "S2"]);
}

#[rstest]
fn dedup_reports_malformed_rows_up_front(feed_dir: TempDir) {
    let file = write_feed(
        feed_dir,
        b"stop_id,stop_name\nS1,Tokyo\nS3,Nagoya\nS2,Osaka,extra\n",
    );
    let options = FeedReadOptions::default().with_drop_duplicates(true);
    let err = read_feed_file(&file.path, &options).expect_err("malformed row");
    assert!(matches!(err, FeedReadError::MalformedRow { line: 4, .. }));
}

#[rstest]
fn undetermined_dialect_is_an_error(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"a,b;c\nd;e\nf,g,h,i\nj|k\n");
    let err = read_feed_file(&file.path, &FeedReadOptions::default()).expect_err("no dialect");
    assert!(matches!(err, FeedReadError::UndeterminedDialect { .. }));
}

#[rstest]
fn invalid_bytes_are_an_encoding_error(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"stop_id\n\xFF\xFE\n");
    let err = read_feed_file(&file.path, &FeedReadOptions::default()).expect_err("bad UTF-8");
    assert!(matches!(err, FeedReadError::Encoding { encoding: "UTF-8", .. }));
}

#[rstest]
fn decodes_shift_jis_feeds(feed_dir: TempDir) {
    let mut contents = b"stop_id,stop_name\nS1,".to_vec();
    contents.extend_from_slice(&[0x93, 0x8C, 0x8B, 0x9E]);
    contents.push(b'\n');
    let file = write_feed(feed_dir, &contents);
    let options = FeedReadOptions::default().with_encoding(FeedEncoding::shift_jis());
    let rows = read_all(&file, &options);
    assert_eq!(rows[0].get("stop_name"), Some("東京"));
}

#[rstest]
fn missing_file_is_an_io_error(feed_dir: TempDir) {
    let path = Utf8PathBuf::from_path_buf(feed_dir.path().join("absent.txt")).expect("UTF-8 path");
    let err = read_feed_file(&path, &FeedReadOptions::default()).expect_err("missing file");
    assert!(matches!(err, FeedReadError::Io { .. }));
}

#[rstest]
fn empty_file_yields_no_rows(feed_dir: TempDir) {
    let file = write_feed(feed_dir, b"");
    let rows = read_feed_file(&file.path, &FeedReadOptions::default()).expect("open feed");
    assert!(rows.header().is_empty());
    assert_eq!(rows.count(), 0);
}

#[rstest]
fn canonical_json_orders_keys() {
    let row: FeedRow = [("stop_name", "東京"), ("stop_id", "S1")].into_iter().collect();
    assert_eq!(
        row.canonical_json().expect("serialise"),
        r#"{"stop_id":"S1","stop_name":"東京"}"#
    );
}
