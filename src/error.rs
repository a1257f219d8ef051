//! Error types and handling for the City Explorer service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::Category;

/// Message sent to clients for every failed request
pub const GENERIC_FAILURE: &str = "Sorry, something went wrong";

/// Failure talking to an external data provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, timeout, TLS)
    #[error("Network error calling {provider}: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status
    #[error("{provider} responded with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to parse {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    /// Provider answered successfully but refused the request in its body
    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    /// No credentials configured for the provider
    #[error("Missing API key for {provider}")]
    MissingKey { provider: &'static str },
}

/// Main error type for the City Explorer service
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Query or connectivity failure against the persistent store
    #[error("Store error: {source}")]
    Store {
        #[from]
        source: sqlx::Error,
    },

    /// External provider failure
    #[error("Provider error: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },

    /// Geocoding returned no results, or no stored location has the given id
    #[error("No location found for '{query}'")]
    NotFound { query: String },

    /// No gateway registered for the requested category
    #[error("No provider registered for category '{0}'")]
    Unregistered(Category),

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ExplorerError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new not-found error for a search query
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Message shown to API clients. Internal distinctions stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE
    }
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.user_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ExplorerError::validation("empty search");
        assert!(matches!(err, ExplorerError::Validation { .. }));

        let err = ExplorerError::config("missing port");
        assert!(matches!(err, ExplorerError::Config { .. }));

        let err = ExplorerError::not_found("98005");
        assert!(err.to_string().contains("98005"));
    }

    #[test]
    fn test_user_message_is_generic() {
        let errors = [
            ExplorerError::not_found("nowhere"),
            ExplorerError::validation("bad"),
            ExplorerError::Unregistered(Category::Trails),
            ExplorerError::from(ProviderError::MissingKey { provider: "yelp" }),
            ExplorerError::from(sqlx::Error::RowNotFound),
        ];
        for err in errors {
            assert_eq!(err.user_message(), GENERIC_FAILURE);
        }
    }

    #[test]
    fn test_provider_error_conversion() {
        let provider_err = ProviderError::Status {
            provider: "darksky",
            status: 503,
            body: "down".to_string(),
        };
        let err: ExplorerError = provider_err.into();
        assert!(matches!(err, ExplorerError::Provider { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_into_response_is_500() {
        let response = ExplorerError::not_found("98005").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
