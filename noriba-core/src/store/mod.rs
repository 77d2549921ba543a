//! SQLite-backed persisted store.
//!
//! [`GtfsStore`] is the single owned handle to the relational store. It is
//! opened once, lent by reference to the load and query layers, and closed
//! explicitly or on drop. Rebuilds need `&mut GtfsStore`, so the borrow checker
//! keeps a rebuild from overlapping queries on the same handle.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use rusqlite::Connection;
use thiserror::Error;

mod query;
mod schema;

pub use query::{QueryError, StopViews};
pub use schema::{
    SchemaError, create_index_sql, create_schema, create_table_sql, drop_schema, ensure_schema,
    reset_schema,
};

/// Where a store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Ephemeral store discarded on close.
    Memory,
    /// Embedded database file.
    File(PathBuf),
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors raised while opening or closing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {location}: {source}")]
    Open {
        /// Location that was being opened.
        location: StoreLocation,
        /// Error reported by SQLite.
        #[source]
        source: rusqlite::Error,
    },
    /// The schema could not be created on open.
    #[error("failed to prepare schema in {location}")]
    Schema {
        /// Location of the store.
        location: StoreLocation,
        /// Underlying schema failure.
        #[source]
        source: SchemaError,
    },
    /// Closing the connection failed.
    #[error("failed to close SQLite database at {location}: {source}")]
    Close {
        /// Location of the store.
        location: StoreLocation,
        /// Error reported by SQLite.
        #[source]
        source: rusqlite::Error,
    },
}

/// Owned handle to a GTFS-JP store.
///
/// # Examples
/// ```
/// use noriba_core::store::GtfsStore;
///
/// let store = GtfsStore::open_in_memory().expect("open store");
/// assert!(store.find_agency_all().expect("query agencies").is_empty());
/// store.close().expect("close store");
/// ```
pub struct GtfsStore {
    connection: Connection,
    location: StoreLocation,
}

impl fmt::Debug for GtfsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GtfsStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl GtfsStore {
    /// Open or create a database file, creating the schema when missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let location = StoreLocation::File(path.to_path_buf());
        match Connection::open(path) {
            Ok(connection) => Self::prepare(connection, location),
            Err(source) => Err(StoreError::Open { location, source }),
        }
    }

    /// Open an ephemeral store with an empty schema.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let location = StoreLocation::Memory;
        match Connection::open_in_memory() {
            Ok(connection) => Self::prepare(connection, location),
            Err(source) => Err(StoreError::Open { location, source }),
        }
    }

    fn prepare(mut connection: Connection, location: StoreLocation) -> Result<Self, StoreError> {
        if let Err(source) = ensure_schema(&mut connection) {
            return Err(StoreError::Schema { location, source });
        }
        log::debug!("opened store at {location}");
        Ok(Self {
            connection,
            location,
        })
    }

    /// Where this store keeps its data.
    #[must_use]
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Shared access to the underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Exclusive access to the underlying connection, used by rebuilds.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Close the connection, reporting any error SQLite raises.
    pub fn close(self) -> Result<(), StoreError> {
        let Self {
            connection,
            location,
        } = self;
        connection
            .close()
            .map_err(|(_, source)| StoreError::Close { location, source })
    }
}
