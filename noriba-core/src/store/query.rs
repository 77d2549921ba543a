//! Read-only queries over a loaded store.
//!
//! Joins are explicit: agencies are joined with their first localisation row,
//! stops are enriched with translations and referencing trips on demand.

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use super::GtfsStore;
use crate::model::{
    Agency, AgencyLocalization, Stop, StopNames, Translation, TripIds, name_matches,
};

/// Errors raised while querying a store.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A query statement failed.
    #[error("failed to {operation}: {source}")]
    Sqlite {
        /// Short description of the query.
        operation: &'static str,
        /// Error reported by SQLite.
        #[source]
        source: rusqlite::Error,
    },
}

impl QueryError {
    fn sqlite(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Sqlite { operation, source }
    }
}

const AGENCIES_SQL: &str = "SELECT a.agency_id, a.agency_name, jp.agency_id, \
     jp.agency_zip_number, jp.agency_president_name \
     FROM agency AS a \
     LEFT JOIN agency_jp AS jp ON jp.rowid = ( \
         SELECT MIN(earliest.rowid) FROM agency_jp AS earliest WHERE earliest.agency_id = a.agency_id \
     ) \
     ORDER BY a.rowid";

const STOP_BY_ID_SQL: &str =
    "SELECT stop_id, stop_name FROM stops WHERE stop_id = ?1 ORDER BY rowid LIMIT 1";

const ALL_STOPS_SQL: &str = "SELECT stop_id, stop_name FROM stops ORDER BY rowid";

// Each branch of the union is served by its own index.
const STOP_TRANSLATIONS_SQL: &str = "SELECT trans_id, COALESCE(lang, language), translation, \
     table_name, field_name, record_id, field_value \
     FROM translations \
     WHERE rowid IN ( \
         SELECT rowid FROM translations WHERE trans_id = ?2 \
         UNION SELECT rowid FROM translations \
             WHERE record_id = ?1 AND table_name = 'stops' AND field_name = 'stop_name' \
         UNION SELECT rowid FROM translations \
             WHERE field_value = ?2 AND table_name = 'stops' AND field_name = 'stop_name' \
     ) \
     ORDER BY rowid";

const STOP_TRIPS_SQL: &str = "SELECT trip_id FROM stop_times WHERE stop_id = ?1 ORDER BY rowid";

/// Raw `stops` row before enrichment.
#[derive(Debug, Clone)]
struct StopRow {
    id: String,
    name: Option<String>,
}

impl GtfsStore {
    /// Every agency in file order, joined with its first localisation row.
    pub fn find_agency_all(&self) -> Result<Vec<Agency>, QueryError> {
        let mut statement = self
            .connection()
            .prepare_cached(AGENCIES_SQL)
            .map_err(QueryError::sqlite("prepare agency query"))?;
        let rows = statement
            .query_map([], |row| {
                let localised: Option<String> = row.get(2)?;
                let localization = match localised {
                    Some(_) => Some(AgencyLocalization {
                        zip_number: row.get(3)?,
                        president_name: row.get(4)?,
                    }),
                    None => None,
                };
                Ok(Agency::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    localization,
                ))
            })
            .map_err(QueryError::sqlite("query agencies"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(QueryError::sqlite("read agency row"))
    }

    /// Look up one stop by its natural key.
    ///
    /// An unknown id yields `Ok(None)`.
    pub fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<Option<Stop>, QueryError> {
        let row = self
            .connection()
            .prepare_cached(STOP_BY_ID_SQL)
            .map_err(QueryError::sqlite("prepare stop lookup"))?
            .query_row(params![id], |row| {
                Ok(StopRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(QueryError::sqlite("look up stop"))?;
        row.map(|row| {
            let names = self.stop_names(&row)?;
            self.assemble(row, names, with_trips)
        })
        .transpose()
    }

    /// Stops whose resolved display name contains `word`, ignoring case.
    ///
    /// The returned iterator yields matches in file order and enriches each
    /// stop as it is reached.
    pub fn search_stops_by_name(
        &self,
        word: &str,
        with_trips: bool,
    ) -> Result<StopViews<'_>, QueryError> {
        let mut statement = self
            .connection()
            .prepare_cached(ALL_STOPS_SQL)
            .map_err(QueryError::sqlite("prepare stop scan"))?;
        let rows = statement
            .query_map([], |row| {
                Ok(StopRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(QueryError::sqlite("scan stops"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(QueryError::sqlite("read stop row"))?;
        Ok(StopViews {
            store: self,
            rows: rows.into_iter(),
            word: word.to_owned(),
            with_trips,
        })
    }

    /// Translations applying to a stop, in file order.
    pub fn find_stop_translations(
        &self,
        stop_id: &str,
        stop_name: Option<&str>,
    ) -> Result<Vec<Translation>, QueryError> {
        find_stop_translations(self.connection(), stop_id, stop_name)
    }

    /// Distinct trips referencing a stop, in first-encountered order.
    pub fn find_trip_ids(&self, stop_id: &str) -> Result<TripIds, QueryError> {
        let mut statement = self
            .connection()
            .prepare_cached(STOP_TRIPS_SQL)
            .map_err(QueryError::sqlite("prepare trip query"))?;
        let trip_ids = statement
            .query_map(params![stop_id], |row| row.get::<_, String>(0))
            .map_err(QueryError::sqlite("query stop trips"))?
            .collect::<Result<TripIds, _>>()
            .map_err(QueryError::sqlite("read trip row"))?;
        Ok(trip_ids)
    }

    fn stop_names(&self, row: &StopRow) -> Result<StopNames, QueryError> {
        let translations = self.find_stop_translations(&row.id, row.name.as_deref())?;
        Ok(StopNames::collect(
            &row.id,
            row.name.as_deref(),
            &translations,
        ))
    }

    fn assemble(&self, row: StopRow, names: StopNames, with_trips: bool) -> Result<Stop, QueryError> {
        let trip_ids = if with_trips {
            Some(self.find_trip_ids(&row.id)?)
        } else {
            None
        };
        let resolved = names.resolve(row.name.as_deref());
        Ok(Stop::new(row.id, resolved, trip_ids))
    }
}

fn find_stop_translations(
    connection: &Connection,
    stop_id: &str,
    stop_name: Option<&str>,
) -> Result<Vec<Translation>, QueryError> {
    let mut statement = connection
        .prepare_cached(STOP_TRANSLATIONS_SQL)
        .map_err(QueryError::sqlite("prepare translation query"))?;
    let rows = statement
        .query_map(params![stop_id, stop_name], |row| {
            Ok(Translation {
                trans_id: row.get(0)?,
                language: row.get(1)?,
                translation: row.get(2)?,
                table_name: row.get(3)?,
                field_name: row.get(4)?,
                record_id: row.get(5)?,
                field_value: row.get(6)?,
            })
        })
        .map_err(QueryError::sqlite("query translations"))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(QueryError::sqlite("read translation row"))
}

/// Stops matched by [`GtfsStore::search_stops_by_name`].
///
/// The sequence is finite and follows the file order of `stops.txt`. It is
/// not restartable; search again to start over. Translations and trips are
/// read per item, so an item may fail independently.
pub struct StopViews<'store> {
    store: &'store GtfsStore,
    rows: std::vec::IntoIter<StopRow>,
    word: String,
    with_trips: bool,
}

impl std::fmt::Debug for StopViews<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopViews")
            .field("remaining", &self.rows.len())
            .field("word", &self.word)
            .field("with_trips", &self.with_trips)
            .finish_non_exhaustive()
    }
}

impl StopViews<'_> {
    fn next_match(&mut self, row: StopRow) -> Result<Option<Stop>, QueryError> {
        let names = self.store.stop_names(&row)?;
        let resolved = names.clone().resolve(row.name.as_deref());
        if !name_matches(&resolved.name, &self.word) {
            return Ok(None);
        }
        self.store.assemble(row, names, self.with_trips).map(Some)
    }
}

impl Iterator for StopViews<'_> {
    type Item = Result<Stop, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(row) = self.rows.next() {
            match self.next_match(row) {
                Ok(Some(stop)) => return Some(Ok(stop)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}
