//! Agency and stop query commands.

use std::{convert::Infallible, io::Write};

use clap::Parser;
use noriba_core::GtfsClient;
use noriba_data::{FeedEncoding, create_client};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{ARG_ENCODING, CliError, DEFAULT_STORE};

/// CLI arguments for the `agency` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Print every agency with its localisation")]
pub(crate) struct AgencyArgs {
    /// Feed directory or SQLite store to read.
    #[arg(value_name = "source", default_value = DEFAULT_STORE)]
    pub(crate) source: String,
    /// Encoding of the feed files when the source is a directory.
    #[arg(long = ARG_ENCODING, value_name = "label")]
    pub(crate) encoding: Option<String>,
}

/// CLI arguments for the `stop` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(
    about = "Look up a stop by id or search stops by name",
    after_help = "Examples:\n  noriba stop --id C03_1\n  noriba stop -w 東京 tmp.sqlite3"
)]
pub(crate) struct StopArgs {
    /// Stop id to look up.
    #[arg(long, value_name = "id", conflicts_with = "word", required_unless_present = "word")]
    pub(crate) id: Option<String>,
    /// Text searched for in stop names, ignoring case.
    #[arg(short = 'w', long, value_name = "word")]
    pub(crate) word: Option<String>,
    /// Attach the trips referencing each stop.
    #[arg(long)]
    pub(crate) trips: bool,
    /// Feed directory or SQLite store to read.
    #[arg(value_name = "source", default_value = DEFAULT_STORE)]
    pub(crate) source: String,
    /// Encoding of the feed files when the source is a directory.
    #[arg(long = ARG_ENCODING, value_name = "label")]
    pub(crate) encoding: Option<String>,
}

/// What a `stop` invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StopQuery {
    Id(String),
    Word(String),
}

impl StopArgs {
    pub(crate) fn query(&self) -> Result<StopQuery, CliError> {
        match (&self.id, &self.word) {
            (Some(id), _) => Ok(StopQuery::Id(id.clone())),
            (None, Some(word)) => Ok(StopQuery::Word(word.clone())),
            (None, None) => Err(CliError::MissingStopQuery),
        }
    }
}

impl From<Infallible> for CliError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

fn encoding(label: Option<&str>) -> Result<FeedEncoding, CliError> {
    label
        .map(FeedEncoding::from_label)
        .transpose()
        .map_err(CliError::Encoding)
        .map(Option::unwrap_or_default)
}

pub(crate) fn run_agency(args: &AgencyArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let client = create_client(&args.source, encoding(args.encoding.as_deref())?)?;
    write_agencies(&client, out)
}

pub(crate) fn run_stop(args: &StopArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let query = args.query()?;
    let client = create_client(&args.source, encoding(args.encoding.as_deref())?)?;
    write_stops(&client, &query, args.trips, out)
}

pub(crate) fn write_agencies<C>(client: &C, out: &mut dyn Write) -> Result<(), CliError>
where
    C: GtfsClient + ?Sized,
    CliError: From<C::Error>,
{
    let document = client.fetch_agencies()?;
    write_document(&document, out)
}

pub(crate) fn write_stops<C>(
    client: &C,
    query: &StopQuery,
    with_trips: bool,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    C: GtfsClient + ?Sized,
    CliError: From<C::Error>,
{
    let document = match query {
        StopQuery::Id(id) => client.find_stop_by_id(id, with_trips)?,
        StopQuery::Word(word) => client.search_stops_by_name(word, with_trips)?,
    };
    write_document(&document, out)
}

/// Pretty-print a document with four-space indentation and a trailing newline.
fn write_document<T: Serialize>(document: &T, out: &mut dyn Write) -> Result<(), CliError> {
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut serializer)
        .map_err(CliError::SerializeDocument)?;
    writeln!(out).map_err(CliError::WriteOutput)
}
