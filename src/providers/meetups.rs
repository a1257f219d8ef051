//! Meetup upcoming events gateway

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{Gateway, format_day, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{Location, Meetup};

const PROVIDER: &str = "meetup";

pub struct MeetupGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UpcomingEventsResponse {
    #[serde(default)]
    events: Vec<MeetupEvent>,
}

#[derive(Debug, Deserialize)]
struct MeetupEvent {
    link: String,
    name: String,
    /// Unix milliseconds
    created: i64,
    group: MeetupGroup,
}

#[derive(Debug, Deserialize)]
struct MeetupGroup {
    name: String,
}

fn to_record(event: MeetupEvent) -> Result<Meetup, ProviderError> {
    let created =
        DateTime::from_timestamp_millis(event.created).ok_or_else(|| ProviderError::Parse {
            provider: PROVIDER,
            message: format!("creation time {} out of range", event.created),
        })?;

    Ok(Meetup {
        link: event.link,
        name: event.name,
        creation_date: format_day(created),
        host: event.group.name,
    })
}

impl MeetupGateway {
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
            "{}/find/upcoming_events?key={}&lat={}&lon={}",
            self.base_url,
            urlencoding::encode(key),
            location.latitude,
            location.longitude
        ))
    }
}

#[async_trait]
impl Gateway<Meetup> for MeetupGateway {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, location: &Location) -> Result<Vec<Meetup>, ProviderError> {
        let url = self.url(location)?;
        let response: UpcomingEventsResponse = get_json(PROVIDER, self.client.get(url)).await?;

        let meetups = response
            .events
            .into_iter()
            .map(to_record)
            .collect::<Result<Vec<_>, _>>()?;
        info!("Got {} events from {}", meetups.len(), PROVIDER);
        Ok(meetups)
    }
}
