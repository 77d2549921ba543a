//! Client answering straight from a feed directory.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use noriba_core::{
    Agency, AgencyDocument, AgencyLocalization, EntityKind, GtfsClient, ResolvedNames, Stop,
    StopDocument, Translation, TranslationIndex, TripIds, name_matches,
};

use super::ClientError;
use crate::feed::{FeedEncoding, FeedReadOptions, FeedRow, read_feed_file};

/// [`GtfsClient`] reading the feed files on every call.
///
/// Nothing is cached, so edits to the directory show up on the next call.
/// Names resolve with the same translation policy as the store.
#[derive(Debug, Clone)]
pub struct FeedClient {
    dir: Utf8PathBuf,
    encoding: FeedEncoding,
}

impl FeedClient {
    /// Client over `dir`, decoding files with `encoding`.
    pub fn new(dir: impl Into<Utf8PathBuf>, encoding: FeedEncoding) -> Self {
        Self {
            dir: dir.into(),
            encoding,
        }
    }

    /// Feed directory being read.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Rows of one entity's file in file order; an absent file has none.
    fn rows(&self, kind: EntityKind) -> Result<Vec<FeedRow>, ClientError> {
        let path = self.dir.join(kind.file_name());
        let present = noriba_fs::is_file(&path).map_err(|source| ClientError::Inspect {
            path: path.clone(),
            source,
        })?;
        if !present {
            return Ok(Vec::new());
        }
        let options = FeedReadOptions::default().with_encoding(self.encoding);
        Ok(read_feed_file(&path, &options)?.collect::<Result<Vec<_>, _>>()?)
    }

    fn translations(&self) -> Result<TranslationIndex, ClientError> {
        Ok(self
            .rows(EntityKind::Translation)?
            .iter()
            .map(translation)
            .collect())
    }

    /// Distinct trips of each wanted stop, from one pass over `stop_times.txt`.
    fn trips_by_stop<'a>(
        &self,
        stop_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<&'a str, TripIds>, ClientError> {
        let mut trips: HashMap<&'a str, TripIds> = stop_ids
            .into_iter()
            .map(|id| (id, TripIds::default()))
            .collect();
        if trips.is_empty() {
            return Ok(trips);
        }
        for stop_time in self.rows(EntityKind::StopTime)? {
            if let (Some(stop_id), Some(trip_id)) =
                (value(&stop_time, "stop_id"), value(&stop_time, "trip_id"))
                && let Some(ids) = trips.get_mut(stop_id)
            {
                ids.push(trip_id);
            }
        }
        Ok(trips)
    }

    /// Build stop views from named rows, attaching trips when asked.
    fn stops(
        &self,
        matched: Vec<(&FeedRow, ResolvedNames)>,
        with_trips: bool,
    ) -> Result<Vec<Stop>, ClientError> {
        let trips = if with_trips {
            Some(self.trips_by_stop(matched.iter().map(|(row, _)| stop_id(row)))?)
        } else {
            None
        };
        Ok(matched
            .into_iter()
            .map(|(row, names)| {
                let id = stop_id(row);
                let trip_ids = trips
                    .as_ref()
                    .map(|trips| trips.get(id).cloned().unwrap_or_default());
                Stop::new(id, names, trip_ids)
            })
            .collect())
    }
}

impl GtfsClient for FeedClient {
    type Error = ClientError;

    fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<StopDocument, ClientError> {
        let stops = self.rows(EntityKind::Stop)?;
        let Some(row) = stops.iter().find(|row| value(row, "stop_id") == Some(id)) else {
            return Ok(StopDocument::from_lookup(None));
        };
        let name = value(row, "stop_name");
        let names = self.translations()?.names(id, name).resolve(name);
        let mut found = self.stops(vec![(row, names)], with_trips)?;
        Ok(StopDocument::from_lookup(found.pop()))
    }

    fn search_stops_by_name(
        &self,
        word: &str,
        with_trips: bool,
    ) -> Result<StopDocument, ClientError> {
        let stops = self.rows(EntityKind::Stop)?;
        let translations = self.translations()?;
        let matched: Vec<(&FeedRow, ResolvedNames)> = stops
            .iter()
            .map(|row| {
                let name = value(row, "stop_name");
                (row, translations.names(stop_id(row), name).resolve(name))
            })
            .filter(|(_, names)| name_matches(&names.name, word))
            .collect();
        Ok(StopDocument::from_matches(self.stops(matched, with_trips)?))
    }

    fn fetch_agencies(&self) -> Result<AgencyDocument, ClientError> {
        let localizations = self.rows(EntityKind::AgencyJp)?;
        let agencies = self
            .rows(EntityKind::Agency)?
            .iter()
            .map(|row| {
                let id = value(row, "agency_id").unwrap_or_default();
                let localization = localizations
                    .iter()
                    .find(|jp| value(jp, "agency_id") == Some(id))
                    .map(|jp| AgencyLocalization {
                        zip_number: value(jp, "agency_zip_number").map(str::to_owned),
                        president_name: value(jp, "agency_president_name").map(str::to_owned),
                    });
                Agency::new(
                    id,
                    value(row, "agency_name").unwrap_or_default(),
                    localization,
                )
            })
            .collect();
        Ok(AgencyDocument::from_agencies(agencies))
    }
}

fn stop_id(row: &FeedRow) -> &str {
    value(row, "stop_id").unwrap_or_default()
}

/// Field value with empty strings read as absent, as a load stores them.
fn value<'a>(row: &'a FeedRow, name: &str) -> Option<&'a str> {
    row.get(name).filter(|value| !value.is_empty())
}

fn translation(row: &FeedRow) -> Translation {
    let owned = |name: &str| value(row, name).map(str::to_owned);
    Translation {
        trans_id: owned("trans_id"),
        language: owned("lang").or_else(|| owned("language")),
        translation: row.get("translation").unwrap_or_default().to_owned(),
        table_name: owned("table_name"),
        field_name: owned("field_name"),
        record_id: owned("record_id"),
        field_value: owned("field_value"),
    }
}
