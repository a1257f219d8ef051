//! Enrichment categories and the storage contract shared by their records

use std::fmt;

use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

/// One of the enrichment domains served next to a resolved location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Weather,
    Business,
    Movies,
    Meetups,
    Trails,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Weather,
        Category::Business,
        Category::Movies,
        Category::Meetups,
        Category::Trails,
    ];

    /// Table holding this category's records
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Category::Weather => "weather",
            Category::Business => "yelp",
            Category::Movies => "movies",
            Category::Meetups => "meetups",
            Category::Trails => "trails",
        }
    }

    /// HTTP route serving this category
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Category::Weather => "/weather",
            Category::Business => "/yelp",
            Category::Movies => "/movies",
            Category::Meetups => "/meetups",
            Category::Trails => "/trails",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Weather => "weather",
            Category::Business => "business",
            Category::Movies => "movies",
            Category::Meetups => "meetups",
            Category::Trails => "trails",
        };
        f.write_str(name)
    }
}

/// A canonical record of one category.
///
/// `COLUMNS` names the record's own columns in the order `bind_to` binds
/// them; the owning location reference is appended by the store. Reads go
/// through `FromRow`, which matches columns by name.
pub trait Record:
    Serialize + for<'r> FromRow<'r, SqliteRow> + fmt::Debug + Clone + Send + Sync + Unpin + 'static
{
    const CATEGORY: Category;
    const COLUMNS: &'static [&'static str];

    fn bind_to<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>>;
}
