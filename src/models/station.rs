use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::error::{CrawlError, Result};
use crate::utils::constants::BUILTIN_STATIONS;

/// A location name paired with its WAQI station identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StationEntry {
    #[validate(length(min = 1))]
    pub location: String,

    #[validate(length(min = 1))]
    pub station_id: String,
}

impl StationEntry {
    pub fn new(location: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            station_id: station_id.into(),
        }
    }
}

/// Ordered, immutable set of stations crawled by a run.
///
/// Location names are unique within a catalog since they form half of the
/// store's natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCatalog {
    entries: Vec<StationEntry>,
}

impl StationCatalog {
    pub fn new(entries: Vec<StationEntry>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.location.as_str()) {
                return Err(CrawlError::Config(format!(
                    "Duplicate location '{}' in station catalog",
                    entry.location
                )));
            }
        }

        Ok(Self { entries })
    }

    /// The stations shipped with the crawler.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_STATIONS
                .iter()
                .map(|(location, station_id)| StationEntry::new(*location, *station_id))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[StationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a StationCatalog {
    type Item = &'a StationEntry;
    type IntoIter = std::slice::Iter<'a, StationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
