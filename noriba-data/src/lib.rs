//! Feed ingestion and client backends for Noriba.
//!
//! Responsibilities:
//! - Read feed files: decoding, dialect sniffing and optional deduplication.
//! - Rebuild a store from a feed directory under one transaction.
//! - Answer client queries from a live feed or a loaded store.
//!
//! Boundaries:
//! - Entity declarations, views and SQL queries live in `noriba-core`.
//! - No logger is installed here; progress goes through `log` or a
//!   [`LoadObserver`].
//!
//! Invariants:
//! - A failed rebuild leaves an empty schema; partial loads are never visible.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod client;
pub mod feed;
mod load;

pub use client::{ClientError, ClientSource, FeedClient, StoreClient, create_client};
pub use feed::{FeedEncoding, FeedReadError, FeedReadOptions, FeedRow, FeedRows, read_feed_file};
pub use load::{
    EntityOutcome, LoadError, LoadObserver, LoadOptions, LoadReport, LogObserver, SilentObserver,
    rebuild, rebuild_with_observer,
};
