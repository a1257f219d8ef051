//! Daily weather summary record

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Category, Record};

/// One day of forecast for a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyForecast {
    /// Human-readable summary, e.g. "Partly cloudy until afternoon."
    pub forecast: String,
    /// Day the summary applies to, rendered as `Wed Oct 17 2018`
    pub time: String,
}

impl Record for DailyForecast {
    const CATEGORY: Category = Category::Weather;
    const COLUMNS: &'static [&'static str] = &["forecast", "time"];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query.bind(self.forecast.clone()).bind(self.time.clone())
    }
}
