use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    routing::get,
};

use crate::config::ExplorerConfig;
use crate::location_resolver::LocationResolver;
use crate::models::{Business, Category, DailyForecast, Location, Meetup, Movie, Record, Trail};
use crate::providers::{self, GoogleGeocoder, ProviderRegistry};
use crate::resolver::Resolver;
use crate::store::Store;
use crate::{ExplorerError, Result};

/// Shared handles behind every request
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub locations: LocationResolver,
    pub resolver: Resolver,
}

impl AppState {
    pub fn new(store: Store, locations: LocationResolver, resolver: Resolver) -> Self {
        Self {
            store,
            locations,
            resolver,
        }
    }

    /// Connect the store and wire the production providers
    pub async fn from_config(config: &ExplorerConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to initialize database")?;

        let client = providers::build_client(config.providers.timeout_seconds)
            .context("Failed to create HTTP client")?;
        let geocoder = GoogleGeocoder::new(client.clone(), &config.providers.geocoding);
        let registry = ProviderRegistry::from_config(&config.providers, &client);

        Ok(Self::new(
            store.clone(),
            LocationResolver::new(store.clone(), Arc::new(geocoder)),
            Resolver::new(store, Arc::new(registry)),
        ))
    }
}

/// `?data=` carries the search string for `/location`. Category routes take
/// the location either JSON-encoded in `data` or as `data[field]=` pairs.
///
/// Extraction never fails with axum's own rejection: malformed or repeated
/// parameters become [`ExplorerError::Validation`] like every other failure.
#[derive(Debug, Default)]
pub struct DataQuery {
    raw: Option<String>,
    fields: HashMap<String, String>,
}

impl<S: Send + Sync> FromRequestParts<S> for DataQuery {
    type Rejection = ExplorerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ExplorerError::validation(rejection.body_text()))?;
        Self::from_pairs(pairs)
    }
}

impl DataQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut query = Self::default();
        for (key, value) in pairs {
            if key == "data" {
                if query.raw.replace(value).is_some() {
                    return Err(ExplorerError::validation("Repeated 'data' query parameter"));
                }
            } else if let Some(field) = key
                .strip_prefix("data[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                if query.fields.insert(field.to_string(), value).is_some() {
                    return Err(ExplorerError::validation(format!(
                        "Repeated 'data[{field}]' query parameter"
                    )));
                }
            }
        }
        Ok(query)
    }

    fn required(self) -> Result<String> {
        self.raw
            .ok_or_else(|| ExplorerError::validation("Missing 'data' query parameter"))
    }

    fn location(self) -> Result<Location> {
        if self.raw.is_none() && !self.fields.is_empty() {
            return self.bracketed_location();
        }
        let raw = self.required()?;
        serde_json::from_str(&raw)
            .map_err(|e| ExplorerError::validation(format!("Invalid location payload: {e}")))
    }

    fn bracketed_location(&self) -> Result<Location> {
        Ok(Location {
            id: self.field("id")?,
            search_query: self.text("search_query"),
            formatted_query: self.text("formatted_query"),
            latitude: self.field("latitude")?,
            longitude: self.field("longitude")?,
        })
    }

    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn field<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| ExplorerError::validation(format!("Missing 'data[{name}]'")))?;
        value
            .trim()
            .parse()
            .map_err(|e| ExplorerError::validation(format!("Invalid 'data[{name}]': {e}")))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/location", get(get_location))
        .route(Category::Weather.route(), get(get_records::<DailyForecast>))
        .route(Category::Business.route(), get(get_records::<Business>))
        .route(Category::Movies.route(), get(get_records::<Movie>))
        .route(Category::Meetups.route(), get(get_records::<Meetup>))
        .route(Category::Trails.route(), get(get_records::<Trail>))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_location(
    State(state): State<AppState>,
    query: DataQuery,
) -> Result<Json<Location>> {
    let search = query.required()?;
    let location = state.locations.resolve_location(&search).await?;
    Ok(Json(location))
}

async fn get_records<R: Record>(
    State(state): State<AppState>,
    query: DataQuery,
) -> Result<Json<Vec<R>>> {
    let location = query.location()?;
    let records = state.resolver.resolve::<R>(&location).await?;
    Ok(Json(records))
}
