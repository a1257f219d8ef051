//! Hiking Project trails gateway

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{DAY_FORMAT, Gateway, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{Location, Trail};

const PROVIDER: &str = "hikingproject";
const CONDITION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct HikingProjectGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TrailsResponse {
    #[serde(default)]
    trails: Vec<HikingTrail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HikingTrail {
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    length: f64,
    #[serde(default)]
    stars: f64,
    #[serde(default)]
    star_votes: i64,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    condition_status: Option<String>,
    condition_date: Option<String>,
}

/// Split a `YYYY-MM-DD HH:MM:SS` condition timestamp into day and clock parts
fn split_condition_date(raw: &str) -> Option<(String, String)> {
    match NaiveDateTime::parse_from_str(raw, CONDITION_DATE_FORMAT) {
        Ok(moment) => Some((
            moment.format(DAY_FORMAT).to_string(),
            moment.format("%H:%M:%S").to_string(),
        )),
        Err(e) => {
            warn!("Ignoring unparseable condition date '{}': {}", raw, e);
            None
        }
    }
}

impl From<HikingTrail> for Trail {
    fn from(trail: HikingTrail) -> Self {
        let (condition_date, condition_time) = trail
            .condition_date
            .as_deref()
            .and_then(split_condition_date)
            .unzip();

        Self {
            name: trail.name,
            location: trail.location,
            length: trail.length,
            stars: trail.stars,
            star_votes: trail.star_votes,
            summary: trail.summary,
            trail_url: trail.url,
            conditions: trail.condition_status,
            condition_date,
            condition_time,
        }
    }
}

impl HikingProjectGateway {
    #[must_use]
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(&config.base_url),
        }
    }

    fn url(&self, location: &Location) -> Result<String, ProviderError> {
        let key = require_key(PROVIDER, self.api_key.as_deref())?;
        Ok(format!(
            "{}/data/get-trails?key={}&lat={}&lon={}",
            self.base_url,
            urlencoding::encode(key),
            location.latitude,
            location.longitude
        ))
    }
}

#[async_trait]
impl Gateway<Trail> for HikingProjectGateway {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, location: &Location) -> Result<Vec<Trail>, ProviderError> {
        let url = self.url(location)?;
        let response: TrailsResponse = get_json(PROVIDER, self.client.get(url)).await?;

        let trails: Vec<Trail> = response.trails.into_iter().map(Trail::from).collect();
        info!("Got {} trails from {}", trails.len(), PROVIDER);
        Ok(trails)
    }
}
