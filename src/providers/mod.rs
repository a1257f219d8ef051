//! Provider gateways
//!
//! A gateway turns a [`Location`] into canonical category records by calling
//! one external HTTP API. Gateways never touch the store and never retry.
//! The [`ProviderRegistry`] maps each category to its gateway, so adding a
//! category means registering one more gateway.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::models::{Category, GeocodedPlace, Location, Record};

pub mod geocode;
pub mod meetups;
pub mod movies;
pub mod trails;
pub mod weather;
pub mod yelp;

pub use geocode::GoogleGeocoder;
pub use meetups::MeetupGateway;
pub use movies::TmdbGateway;
pub use trails::HikingProjectGateway;
pub use weather::DarkSkyGateway;
pub use yelp::YelpGateway;

const USER_AGENT: &str = concat!("CityExplorer/", env!("CARGO_PKG_VERSION"));

/// Rendering used for every calendar day handed to clients, e.g. `Wed Oct 17 2018`
pub(crate) const DAY_FORMAT: &str = "%a %b %d %Y";

/// Fetches one category's records for a location
#[async_trait]
pub trait Gateway<R: Record>: Send + Sync {
    /// Provider name used in logs and errors
    fn name(&self) -> &'static str;

    async fn fetch(&self, location: &Location) -> Result<Vec<R>, ProviderError>;
}

/// Resolves free-text search strings to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// All matches for `query`, best first
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, ProviderError>;
}

/// Category tag to gateway lookup
#[derive(Default)]
pub struct ProviderRegistry {
    gateways: HashMap<Category, Box<dyn Any + Send + Sync>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the gateway serving `R`'s category, replacing any previous one
    #[must_use]
    pub fn with<R: Record>(mut self, gateway: Arc<dyn Gateway<R>>) -> Self {
        self.gateways.insert(R::CATEGORY, Box::new(gateway));
        self
    }

    #[must_use]
    pub fn get<R: Record>(&self) -> Option<Arc<dyn Gateway<R>>> {
        self.gateways
            .get(&R::CATEGORY)?
            .downcast_ref::<Arc<dyn Gateway<R>>>()
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, category: Category) -> bool {
        self.gateways.contains_key(&category)
    }

    /// Registry with the production gateway for every category
    #[must_use]
    pub fn from_config(config: &ProvidersConfig, client: &Client) -> Self {
        Self::new()
            .with::<crate::models::DailyForecast>(Arc::new(DarkSkyGateway::new(
                client.clone(),
                &config.weather,
            )))
            .with::<crate::models::Business>(Arc::new(YelpGateway::new(
                client.clone(),
                &config.yelp,
            )))
            .with::<crate::models::Movie>(Arc::new(TmdbGateway::new(
                client.clone(),
                &config.movies,
            )))
            .with::<crate::models::Meetup>(Arc::new(MeetupGateway::new(
                client.clone(),
                &config.meetups,
            )))
            .with::<crate::models::Trail>(Arc::new(HikingProjectGateway::new(
                client.clone(),
                &config.trails,
            )))
    }
}

/// Build the HTTP client shared by all gateways
pub fn build_client(timeout_seconds: u32) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|source| ProviderError::Network {
            provider: "http client",
            source,
        })
}

/// Send a request and decode a JSON body, mapping each failure mode onto
/// [`ProviderError`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Network { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| ProviderError::Network { provider, source })?;
    debug!("{} returned {} bytes", provider, bytes.len());

    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse {
        provider,
        message: e.to_string(),
    })
}

pub(crate) fn require_key<'a>(
    provider: &'static str,
    key: Option<&'a str>,
) -> Result<&'a str, ProviderError> {
    key.filter(|k| !k.is_empty())
        .ok_or(ProviderError::MissingKey { provider })
}

pub(crate) fn format_day(moment: DateTime<Utc>) -> String {
    moment.format(DAY_FORMAT).to_string()
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
