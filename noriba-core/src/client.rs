//! Backend-agnostic query capability.
//!
//! A [`GtfsClient`] answers the three facade queries against either a live
//! feed directory or a loaded store. Callers hold a `dyn GtfsClient` and never
//! branch on the backend.

use crate::document::{AgencyDocument, StopDocument};

/// Queries answered by every backend.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use noriba_core::{Agency, AgencyDocument, GtfsClient, StopDocument};
///
/// struct Fixed;
///
/// impl GtfsClient for Fixed {
///     type Error = Infallible;
///
///     fn find_stop_by_id(&self, _id: &str, _with_trips: bool) -> Result<StopDocument, Infallible> {
///         Ok(StopDocument::from_lookup(None))
///     }
///
///     fn search_stops_by_name(
///         &self,
///         _word: &str,
///         _with_trips: bool,
///     ) -> Result<StopDocument, Infallible> {
///         Ok(StopDocument::default())
///     }
///
///     fn fetch_agencies(&self) -> Result<AgencyDocument, Infallible> {
///         Ok(AgencyDocument::from_agencies(vec![Agency::new("A1", "Rail", None)]))
///     }
/// }
///
/// let document = Fixed.fetch_agencies().unwrap();
/// assert_eq!(document.count, 1);
/// ```
pub trait GtfsClient {
    /// Error raised when the backend cannot answer.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up one stop by `stop_id`; the document holds zero or one stop.
    fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<StopDocument, Self::Error>;

    /// Find stops whose display name contains `word`, ignoring case.
    fn search_stops_by_name(&self, word: &str, with_trips: bool)
    -> Result<StopDocument, Self::Error>;

    /// List every agency with its optional localisation.
    fn fetch_agencies(&self) -> Result<AgencyDocument, Self::Error>;
}

impl<C: GtfsClient + ?Sized> GtfsClient for Box<C> {
    type Error = C::Error;

    fn find_stop_by_id(&self, id: &str, with_trips: bool) -> Result<StopDocument, Self::Error> {
        (**self).find_stop_by_id(id, with_trips)
    }

    fn search_stops_by_name(
        &self,
        word: &str,
        with_trips: bool,
    ) -> Result<StopDocument, Self::Error> {
        (**self).search_stops_by_name(word, with_trips)
    }

    fn fetch_agencies(&self) -> Result<AgencyDocument, Self::Error> {
        (**self).fetch_agencies()
    }
}
