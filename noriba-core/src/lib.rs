//! Core domain types for the Noriba GTFS-JP toolkit.
//!
//! This crate declares the entity catalog, the records and views the query
//! layer produces, the result documents handed to callers and the
//! [`GtfsClient`] capability both backends implement. With the
//! `store-sqlite` feature it also owns the SQLite store handle, its schema
//! and the read-only queries over it.

pub mod catalog;
mod client;
mod document;
mod model;
#[cfg(feature = "store-sqlite")]
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{
    Cardinality, Column, EntityDef, EntityKind, LOAD_ORDER, Relation, SchemaCatalog,
};
pub use client::GtfsClient;
pub use document::{AgencyDocument, StopDocument};
pub use model::{
    Agency, AgencyLocalization, NameLanguage, ResolvedNames, Stop, StopNames, Translation,
    TranslationIndex, TripIds, name_matches,
};
#[cfg(feature = "store-sqlite")]
pub use store::{GtfsStore, QueryError, StopViews, StoreError, StoreLocation};
