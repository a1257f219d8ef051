//! Location model for geocoded search queries

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

const COORDINATE_TOLERANCE: f64 = 1e-6;

/// A geocoded search query as stored in the `locations` table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Location {
    /// Row id, referenced by every category record
    pub id: i64,
    /// Normalized search string this location was resolved from
    #[serde(default)]
    pub search_query: String,
    /// Address as formatted by the geocoder
    #[serde(default)]
    pub formatted_query: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// First geocoding match for a search string, before it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Normalize a raw search string into a location key.
    pub fn normalize_query(raw: &str) -> Result<String, ExplorerError> {
        let query = raw.trim();
        if query.is_empty() {
            return Err(ExplorerError::validation("Location query cannot be empty"));
        }
        Ok(query.to_string())
    }

    /// Leading component of the formatted address, usually the city name
    #[must_use]
    pub fn city(&self) -> &str {
        self.formatted_query
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// Whether `other` points at the same coordinates, to within about ten centimetres
    #[must_use]
    pub fn same_place(&self, other: &Location) -> bool {
        (self.latitude - other.latitude).abs() < COORDINATE_TOLERANCE
            && (self.longitude - other.longitude).abs() < COORDINATE_TOLERANCE
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
