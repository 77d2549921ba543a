//! Rebuilding a store from a feed directory.
//!
//! A rebuild is the only mutation path of a store. It drops and recreates the
//! schema in its own committed transaction, then stages and inserts every
//! entity inside a single transaction that commits once at the end. Any
//! failure drops that transaction, so the store is left with a fresh, empty
//! schema and partial loads are never observable.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use noriba_core::{
    EntityDef, EntityKind, GtfsStore, LOAD_ORDER,
    store::{SchemaError, reset_schema},
};
use noriba_fs::PathKind;
use rusqlite::Connection;
use thiserror::Error;

use crate::feed::{FeedEncoding, FeedReadError, FeedReadOptions, FeedRows, read_feed_file};

mod insert;
mod observer;

use insert::{StagedRow, insert_rows};
pub use observer::{LoadObserver, LogObserver, SilentObserver};

/// Options for a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Encoding of every feed file.
    pub encoding: FeedEncoding,
    /// Drop exact duplicate rows within each file.
    pub drop_duplicates: bool,
}

/// Errors raised by [`rebuild`]. The store is rolled back before they surface.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The feed directory does not exist or is not a directory.
    #[error("feed directory {path} does not exist or is not a directory")]
    FeedDirectory {
        /// Directory supplied by the caller.
        path: Utf8PathBuf,
    },
    /// Inspecting a feed path failed.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Dropping or recreating the schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Beginning or committing the load transaction failed.
    #[error("failed to {operation} load transaction: {source}")]
    Transaction {
        /// Either `begin` or `commit`.
        operation: &'static str,
        /// Error reported by SQLite.
        #[source]
        source: rusqlite::Error,
    },
    /// A feed file could not be read.
    #[error("failed to load {file}: {source}")]
    Read {
        /// Feed file being read.
        file: &'static str,
        /// Reader failure.
        #[source]
        source: FeedReadError,
    },
    /// A required column was absent or empty.
    #[error("{file} row {row}: required column {column} is empty")]
    MissingValue {
        /// Feed file being read.
        file: &'static str,
        /// One-based position of the row in load order.
        row: usize,
        /// Required column lacking a value.
        column: &'static str,
    },
    /// Inserting staged rows failed.
    #[error("failed to insert rows into {table}: {source}")]
    Insert {
        /// Table receiving the rows.
        table: &'static str,
        /// Error reported by SQLite.
        #[source]
        source: rusqlite::Error,
    },
}

/// What a rebuild did with one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOutcome {
    /// The feed file was absent.
    Missing,
    /// The feed file held no rows.
    Empty,
    /// Rows were inserted.
    Inserted {
        /// Number of inserted rows.
        rows: usize,
    },
}

/// Outcome of a rebuild, one entry per entity in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    entities: Vec<(EntityKind, EntityOutcome)>,
}

impl LoadReport {
    /// Outcome recorded for an entity.
    #[must_use]
    pub fn outcome(&self, kind: EntityKind) -> Option<EntityOutcome> {
        self.entities
            .iter()
            .find(|(entry, _)| *entry == kind)
            .map(|(_, outcome)| *outcome)
    }

    /// Iterate outcomes in load order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, EntityOutcome)> + '_ {
        self.entities.iter().copied()
    }

    /// Total number of inserted rows.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.entities
            .iter()
            .map(|(_, outcome)| match outcome {
                EntityOutcome::Inserted { rows } => *rows,
                EntityOutcome::Missing | EntityOutcome::Empty => 0,
            })
            .sum()
    }
}

/// Rebuild `store` from `feed_dir`, logging progress through the `log` facade.
///
/// Callers must not run queries or another rebuild against the same store
/// while this call is in progress; `&mut GtfsStore` enforces it for a single
/// handle, but separate handles to one database file are not coordinated.
///
/// # Errors
/// See [`rebuild_with_observer`].
pub fn rebuild(
    store: &mut GtfsStore,
    feed_dir: &Utf8Path,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    rebuild_with_observer(store, feed_dir, options, &mut LogObserver)
}

/// Rebuild `store` from `feed_dir`, reporting progress to `observer`.
///
/// # Errors
/// Returns [`LoadError::FeedDirectory`] or [`LoadError::Inspect`] when
/// `feed_dir` is missing, is not a directory or cannot be inspected. That
/// check runs before the schema is dropped, so the store keeps its previous
/// contents. A [`LoadError::Schema`] from the reset also leaves them in place,
/// since the reset runs in its own transaction.
///
/// Failures after the reset has committed roll back the insert transaction
/// and leave the store with an empty schema: [`LoadError::Inspect`] for a
/// feed file, [`LoadError::Read`], [`LoadError::MissingValue`],
/// [`LoadError::Insert`] and [`LoadError::Transaction`].
pub fn rebuild_with_observer(
    store: &mut GtfsStore,
    feed_dir: &Utf8Path,
    options: &LoadOptions,
    observer: &mut dyn LoadObserver,
) -> Result<LoadReport, LoadError> {
    ensure_feed_dir(feed_dir)?;
    let connection = store.connection_mut();
    reset_schema(connection)?;

    let transaction = connection
        .transaction()
        .map_err(|source| LoadError::Transaction {
            operation: "begin",
            source,
        })?;
    let mut report = LoadReport::default();
    for kind in LOAD_ORDER {
        let outcome = load_entity(&transaction, feed_dir, kind.definition(), options, observer)?;
        report.entities.push((kind, outcome));
    }
    transaction
        .commit()
        .map_err(|source| LoadError::Transaction {
            operation: "commit",
            source,
        })?;
    debug!("rebuild committed {} rows", report.total_rows());
    Ok(report)
}

fn ensure_feed_dir(feed_dir: &Utf8Path) -> Result<(), LoadError> {
    match noriba_fs::path_kind(feed_dir) {
        Ok(PathKind::Directory) => Ok(()),
        Ok(_) => Err(LoadError::FeedDirectory {
            path: feed_dir.to_path_buf(),
        }),
        Err(source) => Err(LoadError::Inspect {
            path: feed_dir.to_path_buf(),
            source,
        }),
    }
}

fn load_entity(
    connection: &Connection,
    feed_dir: &Utf8Path,
    entity: &'static EntityDef,
    options: &LoadOptions,
    observer: &mut dyn LoadObserver,
) -> Result<EntityOutcome, LoadError> {
    let path = feed_dir.join(entity.file_name);
    let present = noriba_fs::is_file(&path).map_err(|source| LoadError::Inspect {
        path: path.clone(),
        source,
    })?;
    if !present {
        observer.skipped(entity);
        return Ok(EntityOutcome::Missing);
    }

    observer.loading(entity);
    let read_options = FeedReadOptions::default()
        .with_encoding(options.encoding)
        .with_drop_duplicates(options.drop_duplicates);
    let rows = read_feed_file(&path, &read_options).map_err(|source| LoadError::Read {
        file: entity.file_name,
        source,
    })?;
    let staged = stage_rows(entity, rows)?;
    if staged.is_empty() {
        warn!(
            "{:<19} -- Skip to insert because there are no records.",
            entity.file_name
        );
        observer.empty(entity);
        return Ok(EntityOutcome::Empty);
    }

    observer.inserting(entity, staged.len());
    let rows = insert_rows(connection, entity, &staged).map_err(|source| LoadError::Insert {
        table: entity.table,
        source,
    })?;
    observer.inserted(entity, rows);
    Ok(EntityOutcome::Inserted { rows })
}

/// Align rows with the catalog columns, turning empty values into `None`.
fn stage_rows(entity: &'static EntityDef, rows: FeedRows) -> Result<Vec<StagedRow>, LoadError> {
    for name in rows.header() {
        if entity.column(name).is_none() {
            warn!(
                "{}: ignoring column {name} unknown to table {}",
                entity.file_name, entity.table
            );
        }
    }

    let mut staged = Vec::new();
    for (index, row) in rows.enumerate() {
        let row = row.map_err(|source| LoadError::Read {
            file: entity.file_name,
            source,
        })?;
        let mut values = Vec::with_capacity(entity.columns.len());
        for column in entity.columns {
            let value = row.get(column.name).filter(|value| !value.is_empty());
            if column.required && value.is_none() {
                return Err(LoadError::MissingValue {
                    file: entity.file_name,
                    row: index + 1,
                    column: column.name,
                });
            }
            values.push(value.map(str::to_owned));
        }
        staged.push(values);
    }
    Ok(staged)
}

#[cfg(test)]
mod tests;
