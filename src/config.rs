//! Configuration management for the City Explorer service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ExplorerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistent store settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// External provider credentials and endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://city_explorer.db`
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Credentials and endpoint of one external provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Left empty, the provider's public endpoint is used
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Request timeout in seconds, shared by every provider
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_geocoding")]
    pub geocoding: ProviderConfig,
    #[serde(default = "default_weather")]
    pub weather: ProviderConfig,
    #[serde(default = "default_yelp")]
    pub yelp: ProviderConfig,
    #[serde(default = "default_movies")]
    pub movies: ProviderConfig,
    #[serde(default = "default_meetups")]
    pub meetups: ProviderConfig,
    #[serde(default = "default_trails")]
    pub trails: ProviderConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://city_explorer.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_provider_timeout() -> u32 {
    30
}

fn provider(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: base_url.to_string(),
    }
}

fn default_geocoding() -> ProviderConfig {
    provider("https://maps.googleapis.com")
}

fn default_weather() -> ProviderConfig {
    provider("https://api.darksky.net")
}

fn default_yelp() -> ProviderConfig {
    provider("https://api.yelp.com")
}

fn default_movies() -> ProviderConfig {
    provider("https://api.themoviedb.org")
}

fn default_meetups() -> ProviderConfig {
    provider("https://api.meetup.com")
}

fn default_trails() -> ProviderConfig {
    provider("https://www.hikingproject.com")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_provider_timeout(),
            geocoding: default_geocoding(),
            weather: default_weather(),
            yelp: default_yelp(),
            movies: default_movies(),
            meetups: default_meetups(),
            trails: default_trails(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ProvidersConfig {
    fn all(&self) -> [(&'static str, &ProviderConfig); 6] {
        [
            ("geocoding", &self.geocoding),
            ("weather", &self.weather),
            ("yelp", &self.yelp),
            ("movies", &self.movies),
            ("meetups", &self.meetups),
            ("trails", &self.trails),
        ]
    }
}

impl ExplorerConfig {
    /// Load configuration from `config_path`, the user config dir or
    /// `./config.toml`, then the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CITY_EXPLORER_DATABASE__URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("CITY_EXPLORER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ExplorerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("city-explorer").join("config.toml"))
    }

    /// Honor the plain variable names used by existing deployments
    /// (`PORT`, `DATABASE_URL`, `GOOGLE_API_KEY`, ...).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }

        let keys = [
            ("GOOGLE_API_KEY", &mut self.providers.geocoding),
            ("WEATHER_API_KEY", &mut self.providers.weather),
            ("YELP_API_KEY", &mut self.providers.yelp),
            ("MOVIES_API_KEY", &mut self.providers.movies),
            ("MEETUP_API_KEY", &mut self.providers.meetups),
            ("TRAILS_API_KEY", &mut self.providers.trails),
        ];
        for (name, provider) in keys {
            if let Some(key) = lookup(name) {
                provider.api_key = Some(key);
            }
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.database.url.is_empty() {
            self.database.url = default_database_url();
        }
        if self.database.max_connections == 0 {
            self.database.max_connections = default_max_connections();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_provider_timeout();
        }
        let defaults = ProvidersConfig::default();
        let base_urls = [
            (&mut self.providers.geocoding, defaults.geocoding),
            (&mut self.providers.weather, defaults.weather),
            (&mut self.providers.yelp, defaults.yelp),
            (&mut self.providers.movies, defaults.movies),
            (&mut self.providers.meetups, defaults.meetups),
            (&mut self.providers.trails, defaults.trails),
        ];
        for (provider, fallback) in base_urls {
            if provider.base_url.is_empty() {
                provider.base_url = fallback.base_url;
            }
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ExplorerError::config("Server port cannot be 0").into());
        }

        if self.providers.timeout_seconds > 300 {
            return Err(
                ExplorerError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.database.max_connections > 100 {
            return Err(
                ExplorerError::config("Database max connections cannot exceed 100").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ExplorerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ExplorerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(
                ExplorerError::config("Database URL must be a sqlite: connection string").into(),
            );
        }

        for (name, provider) in self.providers.all() {
            if !provider.base_url.starts_with("http://")
                && !provider.base_url.starts_with("https://")
            {
                return Err(ExplorerError::config(format!(
                    "Base URL for provider '{name}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Provider names without an API key; their endpoints will fail until one is set
    #[must_use]
    pub fn providers_missing_keys(&self) -> Vec<&'static str> {
        self.providers
            .all()
            .into_iter()
            .filter(|(_, p)| p.api_key.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| name)
            .collect()
    }
}
