//! Business listing record

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Category, Record};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Business {
    pub name: String,
    pub image_url: Option<String>,
    /// Price tier as dollar signs ("$", "$$", ...)
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub url: Option<String>,
}

impl Record for Business {
    const CATEGORY: Category = Category::Business;
    const COLUMNS: &'static [&'static str] = &["name", "image_url", "price", "rating", "url"];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.name.clone())
            .bind(self.image_url.clone())
            .bind(self.price.clone())
            .bind(self.rating)
            .bind(self.url.clone())
    }
}
