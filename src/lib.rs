//! City Explorer - location lookup and enrichment service
//!
//! Resolves free-text places to coordinates and serves weather, businesses,
//! films, events and trails for them. Every category is answered
//! cache-aside: stored rows first, the external provider only on a miss.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod providers;
pub mod resolver;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::ExplorerConfig;
pub use error::{ExplorerError, ProviderError};
pub use location_resolver::LocationResolver;
pub use models::{Category, Location, Record};
pub use providers::{Gateway, Geocoder, ProviderRegistry};
pub use resolver::Resolver;
pub use store::Store;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ExplorerError>;
