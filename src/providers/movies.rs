//! The Movie Database search gateway
//!
//! Films are searched by the city part of the formatted address, so
//! "Seattle, WA, USA" queries TMDB for "Seattle".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{Gateway, get_json, require_key, trim_base_url};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{Location, Movie};

const PROVIDER: &str = "tmdb";
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w200_and_h300_bestv2";

pub struct TmdbGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    title: String,
    overview: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: i64,
    poster_path: Option<String>,
    #[serde(default)]
    popularity: f64,
    release_date: Option<String>,
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        Self {
            title: movie.title,
            overview: movie.overview,
            average_votes: movie.vote_average,
            total_votes: movie.vote_count,
            image_url: movie
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|p| format!("{POSTER_BASE_URL}{p}")),
            popularity: movie.popularity,
            released_on: movie.release_date.filter(|d| !d.is_empty()),
        }
    }
}

impl TmdbGateway {
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
            "{}/3/search/movie?api_key={}&query={}",
            self.base_url,
            urlencoding::encode(key),
            urlencoding::encode(location.city())
        ))
    }
}

#[async_trait]
impl Gateway<Movie> for TmdbGateway {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, location: &Location) -> Result<Vec<Movie>, ProviderError> {
        let url = self.url(location)?;
        let response: SearchResponse = get_json(PROVIDER, self.client.get(url)).await?;

        let movies: Vec<Movie> = response.results.into_iter().map(Movie::from).collect();
        info!("Got {} movies from {}", movies.len(), PROVIDER);
        Ok(movies)
    }
}
