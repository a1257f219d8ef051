//! Location Resolution Module
//!
//! Turns a free-text search string into a stored [`Location`]. The store is
//! consulted first; only on a miss is the geocoder called, and only its first
//! match is kept.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::models::Location;
use crate::providers::Geocoder;
use crate::store::Store;
use crate::{ExplorerError, Result};

/// Service for resolving search strings into locations
#[derive(Clone)]
pub struct LocationResolver {
    store: Store,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(store: Store, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Resolve a search string into a stored Location
    #[instrument(skip(self))]
    pub async fn resolve_location(&self, search: &str) -> Result<Location> {
        let query = Location::normalize_query(search)?;

        if let Some(location) = self.store.find_location(&query).await? {
            info!(location_id = location.id, "Got location from store");
            return Ok(location);
        }

        info!("Location not stored, geocoding");
        let place = self
            .geocoder
            .geocode(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExplorerError::not_found(query.as_str()))?;

        let location = self.store.insert_location(&query, &place).await?;
        debug!(
            "Stored location: {} ({})",
            location.formatted_query,
            location.format_coordinates()
        );
        Ok(location)
    }
}
