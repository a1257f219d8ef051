//! Google Geocoding API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{Geocoder, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::GeocodedPlace;

const PROVIDER: &str = "google geocoding";

pub struct GoogleGeocoder {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    /// `OK`, `ZERO_RESULTS`, or an error code such as `REQUEST_DENIED`
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<GeocodeResult> for GeocodedPlace {
    fn from(result: GeocodeResult) -> Self {
        Self {
            formatted_address: result.formatted_address,
            latitude: result.geometry.location.lat,
            longitude: result.geometry.location.lng,
        }
    }
}

impl GoogleGeocoder {
    #[must_use]
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(&config.base_url),
        }
    }

    fn url(&self, query: &str) -> Result<String, ProviderError> {
        let key = require_key(PROVIDER, self.api_key.as_deref())?;
        Ok(format!(
            "{}/maps/api/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(key)
        ))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, ProviderError> {
        debug!("Geocoding location name: {}", query);

        let url = self.url(query)?;
        let response: GeocodeResponse = get_json(PROVIDER, self.client.get(url)).await?;

        match response.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => {}
            Some(status) => {
                return Err(ProviderError::Rejected {
                    provider: PROVIDER,
                    message: format!(
                        "{status}: {}",
                        response.error_message.unwrap_or_default()
                    ),
                });
            }
        }

        let places: Vec<GeocodedPlace> =
            response.results.into_iter().map(GeocodedPlace::from).collect();
        info!("Geocoding '{}' returned {} results", query, places.len());
        Ok(places)
    }
}
