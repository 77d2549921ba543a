//! Unit tests for the rebuild engine.

use super::observer::RecordingObserver;
use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Feed {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl Feed {
    fn with(self, file: &str, contents: &str) -> Self {
        std::fs::write(self.path.join(file), contents).expect("write feed file");
        self
    }
}

#[fixture]
fn feed() -> Feed {
    let dir = TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
    Feed { _dir: dir, path }
}

#[fixture]
fn store() -> GtfsStore {
    GtfsStore::open_in_memory().expect("open store")
}

fn count(store: &GtfsStore, table: &str) -> i64 {
    store
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .expect("count rows")
}

#[rstest]
fn loads_present_files_and_skips_absent_ones(feed: Feed, mut store: GtfsStore) {
    let feed = feed
        .with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n")
        .with("stops.txt", "stop_id,stop_name\nS1,東京\nS2,大阪\n");
    let mut observer = RecordingObserver::default();
    let report = rebuild_with_observer(
        &mut store,
        &feed.path,
        &LoadOptions::default(),
        &mut observer,
    )
    .expect("rebuild");

    assert_eq!(
        report.outcome(EntityKind::Agency),
        Some(EntityOutcome::Inserted { rows: 1 })
    );
    assert_eq!(
        report.outcome(EntityKind::Stop),
        Some(EntityOutcome::Inserted { rows: 2 })
    );
    assert_eq!(report.outcome(EntityKind::Trip), Some(EntityOutcome::Missing));
    assert_eq!(report.total_rows(), 3);
    assert_eq!(report.iter().count(), LOAD_ORDER.len());
    assert_eq!(count(&store, "stops"), 2);
    assert_eq!(count(&store, "trips"), 0);

    assert_eq!(
        observer.events.get(..4),
        Some(
            [
                "loading agency.txt",
                "inserting 1 into agency",
                "inserted 1 into agency",
                "skipped agency_jp.txt",
            ]
            .map(str::to_owned)
            .as_slice()
        )
    );
}

#[rstest]
fn empty_values_load_as_null(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("stops.txt", "stop_id,stop_code,stop_name\nS1,,東京\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("rebuild");
    let code: Option<String> = store
        .connection()
        .query_row("SELECT stop_code FROM stops", [], |row| row.get(0))
        .expect("read stop_code");
    assert_eq!(code, None);
}

#[rstest]
fn values_are_kept_verbatim(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("routes.txt", "route_id,agency_id,route_type\nR1,A1,07\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("rebuild");
    let route_type: String = store
        .connection()
        .query_row("SELECT route_type FROM routes", [], |row| row.get(0))
        .expect("read route_type");
    assert_eq!(route_type, "07");
}

#[rstest]
fn header_only_files_are_reported_empty(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("calendar.txt", "service_id,monday\n");
    let mut observer = RecordingObserver::default();
    let report = rebuild_with_observer(
        &mut store,
        &feed.path,
        &LoadOptions::default(),
        &mut observer,
    )
    .expect("rebuild");
    assert_eq!(
        report.outcome(EntityKind::Calendar),
        Some(EntityOutcome::Empty)
    );
    assert!(observer.events.contains(&"empty calendar.txt".to_owned()));
}

#[rstest]
fn unknown_columns_are_ignored(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("stops.txt", "stop_id,stop_name,colour\nS1,東京,red\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("rebuild");
    assert_eq!(count(&store, "stops"), 1);
}

#[rstest]
fn duplicates_survive_without_dedup(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("stops.txt", "stop_id,stop_name\nS1,東京\nS1,東京\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("rebuild");
    assert_eq!(count(&store, "stops"), 2);
}

#[rstest]
fn dedup_collapses_exact_duplicates(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("stops.txt", "stop_id,stop_name\nS1,東京\nS1,東京\nS2,大阪\n");
    let options = LoadOptions {
        drop_duplicates: true,
        ..LoadOptions::default()
    };
    let report = rebuild(&mut store, &feed.path, &options).expect("rebuild");
    assert_eq!(
        report.outcome(EntityKind::Stop),
        Some(EntityOutcome::Inserted { rows: 2 })
    );
}

#[rstest]
fn rebuilding_twice_gives_the_same_store(feed: Feed, mut store: GtfsStore) {
    let feed = feed
        .with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n")
        .with("stops.txt", "stop_id,stop_name\nS1,東京\n");
    let first = rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("first rebuild");
    let second = rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("second rebuild");
    assert_eq!(first, second);
    assert_eq!(count(&store, "agency"), 1);
    assert_eq!(count(&store, "stops"), 1);
}

#[rstest]
fn malformed_rows_roll_back_the_whole_load(feed: Feed, mut store: GtfsStore) {
    let feed = feed
        .with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n")
        .with("stops.txt", "stop_id,stop_name\nS1,東京\nS2,大阪,extra\n");
    let err = rebuild(&mut store, &feed.path, &LoadOptions::default()).expect_err("load fails");
    assert!(matches!(
        err,
        LoadError::Read {
            file: "stops.txt",
            source: FeedReadError::MalformedRow { line: 3, .. },
        }
    ));
    assert_eq!(count(&store, "agency"), 0);
    assert_eq!(count(&store, "stops"), 0);
}

#[rstest]
fn failed_rebuild_discards_previous_contents(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("first rebuild");
    let feed = feed.with("stops.txt", "stop_id,stop_name\n,東京\n");
    let err = rebuild(&mut store, &feed.path, &LoadOptions::default()).expect_err("load fails");
    assert!(matches!(
        err,
        LoadError::MissingValue {
            file: "stops.txt",
            row: 1,
            column: "stop_id",
        }
    ));
    assert_eq!(count(&store, "agency"), 0);
}

#[rstest]
fn missing_feed_directory_is_rejected(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("first rebuild");
    let absent = feed.path.join("absent");
    let err = rebuild(&mut store, &absent, &LoadOptions::default()).expect_err("no directory");
    assert!(matches!(err, LoadError::FeedDirectory { .. }));
    assert_eq!(count(&store, "agency"), 1);
}

#[rstest]
fn file_in_place_of_feed_directory_keeps_previous_contents(feed: Feed, mut store: GtfsStore) {
    let feed = feed.with("agency.txt", "agency_id,agency_name\nA1,Test Railway\n");
    rebuild(&mut store, &feed.path, &LoadOptions::default()).expect("first rebuild");
    let file = feed.path.join("agency.txt");
    let err = rebuild(&mut store, &file, &LoadOptions::default()).expect_err("not a directory");
    assert!(matches!(err, LoadError::FeedDirectory { ref path } if *path == file));
    assert_eq!(count(&store, "agency"), 1);
}

#[rstest]
fn empty_report_has_no_rows() {
    let report = LoadReport::default();
    assert_eq!(report.total_rows(), 0);
    assert_eq!(report.outcome(EntityKind::Agency), None);
}
