//! Yelp business search gateway

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{Gateway, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{Business, Location};

const PROVIDER: &str = "yelp";
const SEARCH_TERM: &str = "delis";

pub struct YelpGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<YelpBusiness>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    name: String,
    image_url: Option<String>,
    price: Option<String>,
    rating: Option<f64>,
    url: Option<String>,
}

impl From<YelpBusiness> for Business {
    fn from(business: YelpBusiness) -> Self {
        Self {
            name: business.name,
            image_url: business.image_url.filter(|u| !u.is_empty()),
            price: business.price,
            rating: business.rating,
            url: business.url,
        }
    }
}

impl YelpGateway {
    #[must_use]
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(&config.base_url),
        }
    }

    fn url(&self, location: &Location) -> String {
        format!(
            "{}/v3/businesses/search?term={}&latitude={}&longitude={}",
            self.base_url, SEARCH_TERM, location.latitude, location.longitude
        )
    }
}

#[async_trait]
impl Gateway<Business> for YelpGateway {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, location: &Location) -> Result<Vec<Business>, ProviderError> {
        let key = require_key(PROVIDER, self.api_key.as_deref())?;
        let request = self.client.get(self.url(location)).bearer_auth(key);
        let response: SearchResponse = get_json(PROVIDER, request).await?;

        let businesses: Vec<Business> = response.businesses.into_iter().map(Business::from).collect();
        info!("Got {} businesses from {}", businesses.len(), PROVIDER);
        Ok(businesses)
    }
}
