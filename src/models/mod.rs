//! Data models for the City Explorer service
//!
//! - Location: a geocoded search query
//! - Category: the enrichment domains and the `Record` storage contract
//! - One canonical record type per category

pub mod business;
pub mod category;
pub mod location;
pub mod meetup;
pub mod movie;
pub mod trail;
pub mod weather;

pub use business::Business;
pub use category::{Category, Record};
pub use location::{GeocodedPlace, Location};
pub use meetup::Meetup;
pub use movie::Movie;
pub use trail::Trail;
pub use weather::DailyForecast;
