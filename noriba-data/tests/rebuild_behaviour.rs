//! Behavioural tests for rebuilding a store from a feed directory.

use std::cell::RefCell;

use noriba_core::{GtfsStore, LOAD_ORDER};
use noriba_data::{LoadError, LoadOptions, LoadReport, SilentObserver, rebuild_with_observer};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

mod support;

use support::{FeedDir, count_rows, dump_rows};

struct RebuildWorld {
    feed: FeedDir,
    store: RefCell<GtfsStore>,
    outcome: RefCell<Option<Result<LoadReport, LoadError>>>,
}

impl RebuildWorld {
    fn rebuild(&self, options: &LoadOptions) {
        let result = rebuild_with_observer(
            &mut self.store.borrow_mut(),
            self.feed.path(),
            options,
            &mut SilentObserver,
        );
        self.outcome.replace(Some(result));
    }

    fn rows(&self, table: &str, columns: &[&str]) -> Vec<String> {
        dump_rows(&self.store.borrow(), table, columns)
    }
}

#[fixture]
fn world() -> RebuildWorld {
    RebuildWorld {
        feed: FeedDir::new(),
        store: RefCell::new(GtfsStore::open_in_memory().expect("open in-memory store")),
        outcome: RefCell::new(None),
    }
}

#[given("a feed directory with agency and stops files")]
fn agency_and_stops(world: &RebuildWorld) {
    world.feed.write(
        "agency.txt",
        "agency_id,agency_name,agency_url\nA1,Test Railway,\n",
    );
    world.feed.write(
        "stops.txt",
        "stop_id,stop_name,stop_code\nS1,東京,07\nS2,大阪,\n",
    );
}

#[given("a stop_times file with a malformed row")]
fn malformed_stop_times(world: &RebuildWorld) {
    world.feed.write(
        "stop_times.txt",
        "trip_id,stop_id,stop_sequence\nT1,S1,1\nT1,S2,2,late\n",
    );
}

#[given("a feed directory whose stops file repeats a row")]
fn repeated_stops(world: &RebuildWorld) {
    world.feed.write(
        "stops.txt",
        "stop_id,stop_name\nS2,大阪\nS1,東京\nS2,大阪\n",
    );
}

#[when("the store is rebuilt from the feed directory")]
fn rebuilt(world: &RebuildWorld) {
    world.rebuild(&LoadOptions::default());
}

#[when("the store is rebuilt from the feed directory twice")]
fn rebuilt_twice(world: &RebuildWorld) {
    world.rebuild(&LoadOptions::default());
    world.rebuild(&LoadOptions::default());
}

#[when("the store is rebuilt with duplicate removal")]
fn rebuilt_without_duplicates(world: &RebuildWorld) {
    world.rebuild(&LoadOptions {
        drop_duplicates: true,
        ..LoadOptions::default()
    });
}

#[then("the agency and stops tables hold the feed rows")]
fn feed_rows_loaded(world: &RebuildWorld) {
    assert!(matches!(world.outcome.borrow().as_ref(), Some(Ok(_))));
    assert_eq!(
        world.rows("agency", &["agency_id", "agency_name", "agency_url"]),
        ["A1|Test Railway|<null>"]
    );
    assert_eq!(
        world.rows("stops", &["stop_id", "stop_name", "stop_code"]),
        ["S1|東京|07", "S2|大阪|<null>"]
    );
}

#[then("the trips table is empty")]
fn trips_empty(world: &RebuildWorld) {
    assert_eq!(count_rows(&world.store.borrow(), "trips"), 0);
}

#[then("the rebuild fails on stop_times.txt")]
fn fails_on_stop_times(world: &RebuildWorld) {
    let outcome = world.outcome.borrow();
    let Some(Err(LoadError::Read { file, .. })) = outcome.as_ref() else {
        panic!("expected a read failure, got {outcome:?}");
    };
    assert_eq!(*file, "stop_times.txt");
}

#[then("every table is empty")]
fn every_table_empty(world: &RebuildWorld) {
    let store = world.store.borrow();
    for kind in LOAD_ORDER {
        assert_eq!(count_rows(&store, kind.table()), 0, "{}", kind.table());
    }
}

#[then("the stops table holds each distinct row once in sorted order")]
fn distinct_sorted_stops(world: &RebuildWorld) {
    assert_eq!(
        world.rows("stops", &["stop_id", "stop_name"]),
        ["S1|東京", "S2|大阪"]
    );
}

#[scenario(path = "tests/features/rebuild.feature", index = 0)]
fn present_files_load(world: RebuildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/rebuild.feature", index = 1)]
fn malformed_file_rolls_back(world: RebuildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/rebuild.feature", index = 2)]
fn duplicates_dropped_on_request(world: RebuildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/rebuild.feature", index = 3)]
fn rebuild_is_idempotent(world: RebuildWorld) {
    let _ = world;
}
