//! Load command implementation for the Noriba CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use noriba_core::GtfsStore;
use noriba_data::{FeedEncoding, LoadObserver, LoadOptions, LoadReport, rebuild_with_observer};
use noriba_fs::PathKind;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::progress::SpinnerObserver;
use crate::{
    ARG_DATABASE, ARG_DROP_DUPLICATES, ARG_ENCODING, ARG_FEED_DIR, CliError, DEFAULT_STORE,
    ENV_FEED_DIR,
};

/// CLI arguments for the `load` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Drop and recreate the store schema, then load every GTFS-JP \
                 file present in the feed directory inside one transaction. \
                 Options can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Rebuild a store from a feed directory"
)]
#[ortho_config(prefix = "NORIBA")]
pub(crate) struct LoadArgs {
    /// Directory holding the feed files.
    #[arg(value_name = "dir")]
    #[serde(default)]
    pub(crate) feed_dir: Option<Utf8PathBuf>,
    /// SQLite store to rebuild (default: gtfs-jp.sqlite3).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Encoding of the feed files, e.g. utf_8_sig, shift_jis or cp932.
    #[arg(long = ARG_ENCODING, value_name = "label")]
    #[serde(default)]
    pub(crate) encoding: Option<String>,
    /// Drop exact duplicate rows within each file before inserting.
    #[arg(long = ARG_DROP_DUPLICATES)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) drop_duplicates: bool,
}

impl LoadArgs {
    pub(crate) fn into_config(self) -> Result<LoadConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoadConfig::try_from(merged)
    }
}

/// Resolved `load` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadConfig {
    pub(crate) feed_dir: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
    pub(crate) options: LoadOptions,
}

impl LoadConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_directory(&self.feed_dir, ARG_FEED_DIR)
    }

    fn require_directory(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match noriba_fs::path_kind(path) {
            Ok(PathKind::Directory) => Ok(()),
            Ok(PathKind::Missing) => Err(CliError::MissingFeedDirectory {
                field,
                path: path.to_path_buf(),
            }),
            Ok(PathKind::File | PathKind::Other) => Err(CliError::FeedPathNotDirectory {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Rebuild the configured store, creating its parent directory if needed.
    pub(crate) fn execute(&self, observer: &mut dyn LoadObserver) -> Result<LoadReport, CliError> {
        noriba_fs::ensure_parent_dir(&self.database).map_err(|source| {
            CliError::PrepareStore {
                path: self.database.clone(),
                source,
            }
        })?;
        let mut store = GtfsStore::open(&self.database)?;
        let report = rebuild_with_observer(&mut store, &self.feed_dir, &self.options, observer)
            .map_err(|source| CliError::Load {
                feed_dir: self.feed_dir.clone(),
                source,
            })?;
        store.close()?;
        Ok(report)
    }
}

impl TryFrom<LoadArgs> for LoadConfig {
    type Error = CliError;

    fn try_from(args: LoadArgs) -> Result<Self, Self::Error> {
        let feed_dir = args.feed_dir.ok_or(CliError::MissingArgument {
            field: ARG_FEED_DIR,
            env: ENV_FEED_DIR,
        })?;
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE));
        let encoding = args
            .encoding
            .as_deref()
            .map(FeedEncoding::from_label)
            .transpose()
            .map_err(CliError::Encoding)?
            .unwrap_or_default();
        Ok(Self {
            feed_dir,
            database,
            options: LoadOptions {
                encoding,
                drop_duplicates: args.drop_duplicates,
            },
        })
    }
}

/// Resolve `load` arguments into a validated configuration.
pub(crate) fn resolve_load_config(args: LoadArgs) -> Result<LoadConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn run_load(args: LoadArgs) -> Result<LoadReport, CliError> {
    let config = resolve_load_config(args)?;
    let report = config.execute(&mut SpinnerObserver::new())?;
    info!(
        "loaded {} rows from {} into {}",
        report.total_rows(),
        config.feed_dir,
        config.database
    );
    Ok(report)
}
