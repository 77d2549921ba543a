//! Error types emitted by the Noriba CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use noriba_core::StoreError;
use noriba_data::{ClientError, FeedReadError, LoadError};
use thiserror::Error;

/// Errors emitted by the Noriba CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass <{field}> or set {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Neither a stop id nor a search word was given.
    #[error("either --id or --word is required")]
    MissingStopQuery,
    /// The encoding label is not recognised.
    #[error("invalid --encoding: {0}")]
    Encoding(#[source] FeedReadError),
    /// The feed directory does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingFeedDirectory {
        /// Argument name.
        field: &'static str,
        /// Path given.
        path: Utf8PathBuf,
    },
    /// The feed path exists but is not a directory.
    #[error("{field} path {path:?} exists but is not a directory")]
    FeedPathNotDirectory {
        /// Argument name.
        field: &'static str,
        /// Path given.
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument name.
        field: &'static str,
        /// Path given.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Creating the store's parent directory failed.
    #[error("failed to prepare store directory for {path:?}: {source}")]
    PrepareStore {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening or closing the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Rebuilding the store failed; it was left empty.
    #[error("failed to load {feed_dir:?}: {source}")]
    Load {
        /// Feed directory being loaded.
        feed_dir: Utf8PathBuf,
        /// Load failure.
        #[source]
        source: LoadError,
    },
    /// Building a client or answering a query failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Serializing a result document failed.
    #[error("failed to serialize result document: {0}")]
    SerializeDocument(#[source] serde_json::Error),
    /// Writing the result document failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
