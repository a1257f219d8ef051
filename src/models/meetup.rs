//! Social event record

use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use super::{Category, Record};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Meetup {
    pub link: String,
    pub name: String,
    /// When the event was created, rendered as `Wed Oct 17 2018`
    pub creation_date: String,
    /// Name of the hosting group
    pub host: String,
}

impl Record for Meetup {
    const CATEGORY: Category = Category::Meetups;
    const COLUMNS: &'static [&'static str] = &["link", "name", "creation_date", "host"];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.link.clone())
            .bind(self.name.clone())
            .bind(self.creation_date.clone())
            .bind(self.host.clone())
    }
}
