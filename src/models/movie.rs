//! Film record

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Category, Record};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Movie {
    pub title: String,
    pub overview: Option<String>,
    pub average_votes: f64,
    pub total_votes: i64,
    /// Full poster URL, absent when the film has no poster
    pub image_url: Option<String>,
    pub popularity: f64,
    pub released_on: Option<String>,
}

impl Record for Movie {
    const CATEGORY: Category = Category::Movies;
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "overview",
        "average_votes",
        "total_votes",
        "image_url",
        "popularity",
        "released_on",
    ];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.title.clone())
            .bind(self.overview.clone())
            .bind(self.average_votes)
            .bind(self.total_votes)
            .bind(self.image_url.clone())
            .bind(self.popularity)
            .bind(self.released_on.clone())
    }
}
