//! Client answering from a loaded store.

use std::path::Path;

use noriba_core::{AgencyDocument, GtfsClient, GtfsStore, StopDocument, StoreError};

use super::ClientError;

/// [`GtfsClient`] backed by an owned [`GtfsStore`].
#[derive(Debug)]
pub struct StoreClient {
    store: GtfsStore,
}

impl StoreClient {
    /// Wrap an open store.
    #[must_use]
    pub const fn new(store: GtfsStore) -> Self {
        Self { store }
    }

    /// Open the store file at `path`, creating an empty schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        GtfsStore::open(path).map(Self::new)
    }

    /// Open an ephemeral in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        GtfsStore::open_in_memory().map(Self::new)
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &GtfsStore {
        &self.store
    }

    /// Borrow the store mutably, for a rebuild.
    pub const fn store_mut(&mut self) -> &mut GtfsStore {
        &mut self.store
    }

    /// Release the store handle.
    #[must_use]
    pub fn into_store(self) -> GtfsStore {
        self.store
    }
}

impl GtfsClient for StoreClient {
    type Error = ClientError;

    fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<StopDocument, ClientError> {
        let stop = self.store.find_stop_by_id(id, with_trips)?;
        Ok(StopDocument::from_lookup(stop))
    }

    fn search_stops_by_name(
        &self,
        word: &str,
        with_trips: bool,
    ) -> Result<StopDocument, ClientError> {
        let stops = self
            .store
            .search_stops_by_name(word, with_trips)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StopDocument::from_matches(stops))
    }

    fn fetch_agencies(&self) -> Result<AgencyDocument, ClientError> {
        Ok(AgencyDocument::from_agencies(self.store.find_agency_all()?))
    }
}
