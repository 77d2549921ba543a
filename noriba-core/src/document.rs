//! Result documents returned by client queries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::{Agency, Stop};

/// Every agency in the feed with its count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgencyDocument {
    /// Number of agencies listed.
    pub count: usize,
    /// Agencies in feed order.
    pub agencies: Vec<Agency>,
}

impl AgencyDocument {
    /// Wrap a list of agencies, deriving the count.
    #[must_use]
    pub fn from_agencies(agencies: Vec<Agency>) -> Self {
        Self {
            count: agencies.len(),
            agencies,
        }
    }
}

/// Stops matched by a lookup or a search.
///
/// `count` always equals `stops.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StopDocument {
    /// Number of stops listed.
    pub count: usize,
    /// Matched stops in feed order.
    pub stops: Vec<Stop>,
}

impl StopDocument {
    /// Document for an id lookup: zero or one stop.
    #[must_use]
    pub fn from_lookup(stop: Option<Stop>) -> Self {
        Self::from_matches(stop.into_iter())
    }

    /// Document for a name search.
    pub fn from_matches<I>(stops: I) -> Self
    where
        I: IntoIterator<Item = Stop>,
    {
        let stops: Vec<Stop> = stops.into_iter().collect();
        Self {
            count: stops.len(),
            stops,
        }
    }
}
