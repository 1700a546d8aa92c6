//! Session-scoped location bookmarks.
//!
//! Entries are keyed by the `(city, location)` pair and kept in insertion
//! order. Nothing here touches disk: a [`Favourites`] lives exactly as long
//! as the session that owns it.

use serde::{Deserialize, Serialize};

use crate::model::AirQualityReading;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouriteEntry {
    pub city: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub aqi: Option<f64>,
}

impl FavouriteEntry {
    pub fn new(city: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            location: location.into(),
            lat: None,
            lon: None,
            aqi: None,
        }
    }

    pub fn with_aqi(mut self, aqi: f64) -> Self {
        self.aqi = Some(aqi);
        self
    }

    fn matches(&self, city: &str, location: &str) -> bool {
        self.city == city && self.location == location
    }
}

impl From<&AirQualityReading> for FavouriteEntry {
    fn from(r: &AirQualityReading) -> Self {
        Self {
            city: r.city.clone(),
            location: r.location.clone(),
            lat: r.lat,
            lon: r.lon,
            aqi: r.aqi,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Favourites {
    entries: Vec<FavouriteEntry>,
}

impl Favourites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` unless its key is already present. Returns whether it was inserted.
    pub fn add(&mut self, entry: FavouriteEntry) -> bool {
        if self.contains(&entry.city, &entry.location) {
            return false;
        }
        tracing::debug!(city = %entry.city, location = %entry.location, "favourite added");
        self.entries.push(entry);
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, city: &str, location: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(city, location));
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(%city, %location, "favourite removed");
        }
        removed
    }

    /// Add if absent, remove if present. Returns the membership after the call.
    pub fn toggle(&mut self, entry: FavouriteEntry) -> bool {
        if self.remove(&entry.city, &entry.location) {
            false
        } else {
            self.add(entry)
        }
    }

    pub fn contains(&self, city: &str, location: &str) -> bool {
        self.entries.iter().any(|e| e.matches(city, location))
    }

    /// Snapshot of the current entries in insertion order.
    pub fn list(&self) -> Vec<FavouriteEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy fresh AQI values onto matching entries. Membership and order are unchanged.
    pub fn update_aqi(&mut self, readings: &[AirQualityReading]) {
        for entry in &mut self.entries {
            if let Some(r) = readings.iter().find(|r| r.is_at(&entry.city, &entry.location)) {
                entry.aqi = r.aqi;
            }
        }
    }
}
