//! Test-only, in-memory `GtfsClient` implementation used by unit and
//! behaviour tests.

use std::convert::Infallible;

use crate::{Agency, AgencyDocument, GtfsClient, Stop, StopDocument, name_matches};

/// In-memory `GtfsClient` holding already resolved views.
///
/// Stops are kept with their trips; queries that do not ask for trips strip
/// them. Lookups perform a linear scan and suit small fixtures only.
#[derive(Default, Debug, Clone)]
pub struct MemoryClient {
    agencies: Vec<Agency>,
    stops: Vec<Stop>,
}

impl MemoryClient {
    /// Add an agency.
    #[must_use]
    pub fn with_agency(mut self, agency: Agency) -> Self {
        self.agencies.push(agency);
        self
    }

    /// Add a stop.
    #[must_use]
    pub fn with_stop(mut self, stop: Stop) -> Self {
        self.stops.push(stop);
        self
    }

    fn view(stop: &Stop, with_trips: bool) -> Stop {
        let mut view = stop.clone();
        if with_trips {
            view.trip_ids.get_or_insert_with(Vec::new);
        } else {
            view.trip_ids = None;
        }
        view
    }
}

impl GtfsClient for MemoryClient {
    type Error = Infallible;

    fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<StopDocument, Infallible> {
        let stop = self
            .stops
            .iter()
            .find(|stop| stop.id == id)
            .map(|stop| Self::view(stop, with_trips));
        Ok(StopDocument::from_lookup(stop))
    }

    fn search_stops_by_name(
        &self,
        word: &str,
        with_trips: bool,
    ) -> Result<StopDocument, Infallible> {
        Ok(StopDocument::from_matches(
            self.stops
                .iter()
                .filter(|stop| name_matches(&stop.name, word))
                .map(|stop| Self::view(stop, with_trips)),
        ))
    }

    fn fetch_agencies(&self) -> Result<AgencyDocument, Infallible> {
        Ok(AgencyDocument::from_agencies(self.agencies.clone()))
    }
}
