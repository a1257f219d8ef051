//! Cache-aside resolution of category records
//!
//! Stored records for a location are returned as-is. When none are stored,
//! the category's gateway is called and whatever it returns is inserted and
//! handed back. An empty provider answer stores nothing, so the next request
//! asks the provider again. Concurrent misses for the same location and
//! category may both fetch and both insert.
//!
//! The location a client sends is only a reference: it must name a stored
//! row and carry that row's coordinates, and the stored row is what the
//! provider is asked about.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::models::{Location, Record};
use crate::providers::ProviderRegistry;
use crate::store::Store;
use crate::{ExplorerError, Result};

#[derive(Clone)]
pub struct Resolver {
    store: Store,
    providers: Arc<ProviderRegistry>,
}

impl Resolver {
    pub fn new(store: Store, providers: Arc<ProviderRegistry>) -> Self {
        Self { store, providers }
    }

    /// Records of `R`'s category for `location`, fetched and stored on a miss
    #[instrument(skip(self, location), fields(category = %R::CATEGORY, location_id = location.id))]
    pub async fn resolve<R: Record>(&self, location: &Location) -> Result<Vec<R>> {
        let location = &self.stored_location(location).await?;

        let stored = self.store.find_records::<R>(location.id).await?;
        if !stored.is_empty() {
            info!(count = stored.len(), "Got data from store");
            return Ok(stored);
        }

        let gateway = self
            .providers
            .get::<R>()
            .ok_or(ExplorerError::Unregistered(R::CATEGORY))?;

        info!(provider = gateway.name(), "Nothing stored, calling provider");
        let fetched = gateway.fetch(location).await?;

        if fetched.is_empty() {
            debug!("Provider returned no records, nothing to store");
            return Ok(fetched);
        }

        self.store.insert_records(location.id, &fetched).await?;
        info!(count = fetched.len(), "Stored provider records");
        Ok(fetched)
    }

    async fn stored_location(&self, claimed: &Location) -> Result<Location> {
        let stored = self
            .store
            .find_location_by_id(claimed.id)
            .await?
            .ok_or_else(|| ExplorerError::not_found(format!("location id {}", claimed.id)))?;

        if !stored.same_place(claimed) {
            return Err(ExplorerError::validation(format!(
                "Coordinates ({}) do not match stored location {}",
                claimed.format_coordinates(),
                stored.id
            )));
        }
        Ok(stored)
    }
}
