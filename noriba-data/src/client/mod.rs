//! The two [`GtfsClient`] backends and the factory choosing between them.
//!
//! [`FeedClient`] answers straight from a feed directory and rereads the
//! files it needs on every call. [`StoreClient`] owns a [`GtfsStore`] and
//! answers from the loaded schema. [`create_client`] picks one from a source
//! string; callers only ever see `dyn GtfsClient<Error = ClientError>`.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use noriba_core::{GtfsClient, QueryError, StoreError, StoreLocation};
use noriba_fs::PathKind;
use thiserror::Error;

use crate::feed::{FeedEncoding, FeedReadError};

mod feed;
mod store;

pub use feed::FeedClient;
pub use store::StoreClient;

/// Errors raised by either client backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The source path could not be inspected.
    #[error("failed to inspect source {path}: {source}")]
    Inspect {
        /// Source given to the factory.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// A feed file could not be read.
    #[error(transparent)]
    Feed(#[from] FeedReadError),
    /// The store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A store query failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Backend selected for a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSource {
    /// Live feed directory.
    Feed(Utf8PathBuf),
    /// Loaded store.
    Store(StoreLocation),
}

impl ClientSource {
    /// Classify a source string.
    ///
    /// An existing directory is a live feed, the empty string is an in-memory
    /// store and anything else is a store file path.
    ///
    /// # Examples
    /// ```
    /// use noriba_core::StoreLocation;
    /// use noriba_data::ClientSource;
    ///
    /// let source = ClientSource::classify("").expect("classify");
    /// assert_eq!(source, ClientSource::Store(StoreLocation::Memory));
    /// ```
    pub fn classify(source: &str) -> Result<Self, ClientError> {
        if source.is_empty() {
            return Ok(Self::Store(StoreLocation::Memory));
        }
        let path = Utf8Path::new(source);
        match noriba_fs::path_kind(path) {
            Ok(PathKind::Directory) => Ok(Self::Feed(path.to_path_buf())),
            Ok(_) => Ok(Self::Store(StoreLocation::File(path.as_std_path().to_path_buf()))),
            Err(source) => Err(ClientError::Inspect {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Build the client answering for `source`.
///
/// `encoding` applies to the live feed backend only. Opening a store that was
/// never loaded creates an empty schema, so it answers with empty documents.
pub fn create_client(
    source: &str,
    encoding: FeedEncoding,
) -> Result<Box<dyn GtfsClient<Error = ClientError>>, ClientError> {
    let source = ClientSource::classify(source)?;
    debug!("selected client backend {source:?}");
    Ok(match source {
        ClientSource::Feed(dir) => Box::new(FeedClient::new(dir, encoding)),
        ClientSource::Store(StoreLocation::Memory) => Box::new(StoreClient::open_in_memory()?),
        ClientSource::Store(StoreLocation::File(path)) => Box::new(StoreClient::open(path)?),
    })
}
