//! Hiking trail record

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Category, Record};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Trail {
    pub name: String,
    /// Free-form place description, e.g. "Issaquah, Washington"
    pub location: String,
    /// Length in miles
    pub length: f64,
    pub stars: f64,
    pub star_votes: i64,
    pub summary: String,
    pub trail_url: String,
    /// Last reported condition status
    pub conditions: Option<String>,
    pub condition_date: Option<String>,
    pub condition_time: Option<String>,
}

impl Record for Trail {
    const CATEGORY: Category = Category::Trails;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "location",
        "length",
        "stars",
        "star_votes",
        "summary",
        "trail_url",
        "conditions",
        "condition_date",
        "condition_time",
    ];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.name.clone())
            .bind(self.location.clone())
            .bind(self.length)
            .bind(self.stars)
            .bind(self.star_votes)
            .bind(self.summary.clone())
            .bind(self.trail_url.clone())
            .bind(self.conditions.clone())
            .bind(self.condition_date.clone())
            .bind(self.condition_time.clone())
    }
}
