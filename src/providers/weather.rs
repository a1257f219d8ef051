//! Dark Sky daily forecast gateway

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{DAY_FORMAT, Gateway, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{DailyForecast, Location};

const PROVIDER: &str = "darksky";

pub struct DarkSkyGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    /// Hours east of UTC at the location
    #[serde(default)]
    offset: f64,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    data: Vec<DarkSkyDay>,
}

#[derive(Debug, Deserialize)]
struct DarkSkyDay {
    /// Unix seconds at local midnight
    time: i64,
    #[serde(default)]
    summary: String,
}

impl DarkSkyGateway {
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
            "{}/forecast/{}/{},{}",
            self.base_url,
            urlencoding::encode(key),
            location.latitude,
            location.longitude
        ))
    }
}

fn local_offset(hours: f64) -> Result<FixedOffset, ProviderError> {
    let seconds = (hours * 3600.0).round();
    FixedOffset::east_opt(seconds as i32)
        .filter(|_| seconds.is_finite())
        .ok_or_else(|| ProviderError::Parse {
            provider: PROVIDER,
            message: format!("utc offset {hours} out of range"),
        })
}

/// Days are rendered as the calendar date at the location
fn to_record(day: DarkSkyDay, offset: FixedOffset) -> Result<DailyForecast, ProviderError> {
    let moment = DateTime::from_timestamp(day.time, 0).ok_or_else(|| ProviderError::Parse {
        provider: PROVIDER,
        message: format!("timestamp {} out of range", day.time),
    })?;

    Ok(DailyForecast {
        forecast: day.summary,
        time: moment.with_timezone(&offset).format(DAY_FORMAT).to_string(),
    })
}

#[async_trait]
impl Gateway<DailyForecast> for DarkSkyGateway {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, location: &Location) -> Result<Vec<DailyForecast>, ProviderError> {
        let url = self.url(location)?;
        let response: ForecastResponse = get_json(PROVIDER, self.client.get(url)).await?;
        let offset = local_offset(response.offset)?;

        let days = response
            .daily
            .data
            .into_iter()
            .map(|day| to_record(day, offset))
            .collect::<Result<Vec<_>, _>>()?;

        info!("Got {} daily forecasts from {}", days.len(), PROVIDER);
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location() -> Location {
        Location {
            id: 1,
            search_query: "98005".to_string(),
            formatted_query: "Bellevue, WA 98005, USA".to_string(),
            latitude: 47.615_392,
            longitude: -122.171_172,
        }
    }

    fn gateway(base_url: &str, key: Option<&str>) -> DarkSkyGateway {
        DarkSkyGateway::new(
            Client::new(),
            &ProviderConfig {
                api_key: key.map(str::to_string),
                base_url: base_url.to_string(),
            },
        )
    }

    fn utc() -> FixedOffset {
        local_offset(0.0).unwrap()
    }

    #[test]
    fn test_to_record_formats_day() {
        let record = to_record(
            DarkSkyDay {
                time: 1_539_734_400,
                summary: "Mostly cloudy throughout the day.".to_string(),
            },
            utc(),
        )
        .unwrap();
        assert_eq!(record.time, "Wed Oct 17 2018");
        assert_eq!(record.forecast, "Mostly cloudy throughout the day.");
    }

    #[test]
    fn test_to_record_rejects_out_of_range_timestamp() {
        let err = to_record(
            DarkSkyDay {
                time: i64::MAX,
                summary: String::new(),
            },
            utc(),
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[test]
    fn test_to_record_uses_local_date_east_of_utc() {
        // Local midnight in Tokyo, still the previous day in UTC
        let record = to_record(
            DarkSkyDay {
                time: 1_539_702_000,
                summary: "Clear".to_string(),
            },
            local_offset(9.0).unwrap(),
        )
        .unwrap();
        assert_eq!(record.time, "Wed Oct 17 2018");
    }

    #[test]
    fn test_local_offset_bounds() {
        assert_eq!(local_offset(5.5).unwrap().local_minus_utc(), 19_800);
        assert_eq!(local_offset(-7.0).unwrap().local_minus_utc(), -25_200);
        assert!(local_offset(30.0).is_err());
        assert!(local_offset(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_fetch_keeps_provider_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/test-key/47.615392,-122.171172"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "data": [
                        { "time": 1_539_734_400, "summary": "Rain" },
                        { "time": 1_539_820_800, "summary": "Clouds" }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let days = gateway(&server.uri(), Some("test-key"))
            .fetch(&location())
            .await
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].forecast, "Rain");
        assert_eq!(days[1].time, "Thu Oct 18 2018");
    }

    #[tokio::test]
    async fn test_fetch_applies_response_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "Asia/Tokyo",
                "offset": 9,
                "daily": {
                    "data": [
                        { "time": 1_539_702_000, "summary": "Clear" },
                        { "time": 1_539_788_400, "summary": "Breezy" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let days = gateway(&server.uri(), Some("test-key"))
            .fetch(&location())
            .await
            .unwrap();

        assert_eq!(days[0].time, "Wed Oct 17 2018");
        assert_eq!(days[1].time, "Thu Oct 18 2018");
    }

    #[tokio::test]
    async fn test_fetch_surfaces_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = gateway(&server.uri(), Some("bad-key"))
            .fetch(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = gateway(&server.uri(), Some("test-key"))
            .fetch(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_without_key_does_not_call_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = gateway(&server.uri(), None)
            .fetch(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingKey { .. }));
    }
}
