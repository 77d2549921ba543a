//! Facade crate for the Noriba GTFS-JP toolkit.
//!
//! This crate re-exports the core domain types and exposes the SQLite store,
//! the feed loader and the client backends behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use noriba_core::{
    Agency, AgencyDocument, AgencyLocalization, EntityDef, EntityKind, GtfsClient, LOAD_ORDER,
    NameLanguage, SchemaCatalog, Stop, StopDocument, Translation, TranslationIndex, name_matches,
};

#[cfg(feature = "store-sqlite")]
pub use noriba_core::{GtfsStore, QueryError, StopViews, StoreError, StoreLocation};

#[cfg(feature = "store-sqlite")]
pub use noriba_data::{
    ClientError, EntityOutcome, FeedClient, FeedEncoding, FeedReadError, FeedReadOptions,
    FeedRows, LoadError, LoadObserver, LoadOptions, LoadReport, StoreClient, create_client,
    read_feed_file, rebuild, rebuild_with_observer,
};
