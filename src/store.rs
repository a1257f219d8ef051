//! Persistent store for resolved locations and category records
//!
//! One SQLite table per category plus `locations`. Category rows carry a
//! `location_id` reference and are read back in insertion order.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::Result;
use crate::models::{Category, GeocodedPlace, Location, Record};

const LOCATION_COLUMNS: &str = "id, search_query, formatted_query, latitude, longitude";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (and create if missing) the database at `url` and ensure the schema exists.
    ///
    /// In-memory databases live only as long as their connection, so they are
    /// pinned to a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!("Opening SQLite database at: {}", url);

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating tables as needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        Self::run_migrations(&pool).await?;
        info!("Database initialization complete");
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                search_query TEXT NOT NULL UNIQUE,
                formatted_query TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                forecast TEXT NOT NULL,
                time TEXT NOT NULL,
                location_id INTEGER NOT NULL REFERENCES locations (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS yelp (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                image_url TEXT,
                price TEXT,
                rating REAL,
                url TEXT,
                location_id INTEGER NOT NULL REFERENCES locations (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                overview TEXT,
                average_votes REAL NOT NULL,
                total_votes INTEGER NOT NULL,
                image_url TEXT,
                popularity REAL NOT NULL,
                released_on TEXT,
                location_id INTEGER NOT NULL REFERENCES locations (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meetups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                link TEXT NOT NULL,
                name TEXT NOT NULL,
                creation_date TEXT NOT NULL,
                host TEXT NOT NULL,
                location_id INTEGER NOT NULL REFERENCES locations (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                length REAL NOT NULL,
                stars REAL NOT NULL,
                star_votes INTEGER NOT NULL,
                summary TEXT NOT NULL,
                trail_url TEXT NOT NULL,
                conditions TEXT,
                condition_date TEXT,
                condition_time TEXT,
                location_id INTEGER NOT NULL REFERENCES locations (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        for category in Category::ALL {
            let table = category.table();
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_location ON {table} (location_id)"
            ))
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    // Location operations

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn find_location(&self, search_query: &str) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE search_query = ?1"
        ))
        .bind(search_query)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn find_location_by_id(&self, id: i64) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// Store the geocoded place for `search_query` and return the stored row.
    ///
    /// If another request stored the same query first, its row is returned
    /// unchanged.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn insert_location(
        &self,
        search_query: &str,
        place: &GeocodedPlace,
    ) -> Result<Location> {
        sqlx::query(
            r#"
            INSERT INTO locations (search_query, formatted_query, latitude, longitude)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (search_query) DO NOTHING
            "#,
        )
        .bind(search_query)
        .bind(&place.formatted_address)
        .bind(place.latitude)
        .bind(place.longitude)
        .execute(&self.pool)
        .await?;

        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE search_query = ?1"
        ))
        .bind(search_query)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    #[cfg(test)]
    pub(crate) async fn count_locations(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Category record operations

    /// All records of `R`'s category owned by `location_id`, oldest first
    #[tracing::instrument(level = "debug", skip(self), fields(category = %R::CATEGORY))]
    pub async fn find_records<R: Record>(&self, location_id: i64) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE location_id = ?1 ORDER BY id",
            R::COLUMNS.join(", "),
            R::CATEGORY.table()
        );

        let records = sqlx::query_as::<_, R>(&sql)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} stored records", records.len());
        Ok(records)
    }

    /// Insert a batch of records for `location_id`.
    ///
    /// Plain inserts, never upserts. The batch commits as a whole.
    #[tracing::instrument(level = "debug", skip(self, records), fields(category = %R::CATEGORY, count = records.len()))]
    pub async fn insert_records<R: Record>(&self, location_id: i64, records: &[R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; R::COLUMNS.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}, location_id) VALUES ({})",
            R::CATEGORY.table(),
            R::COLUMNS.join(", "),
            placeholders
        );

        let mut tx = self.pool.begin().await?;
        for record in records {
            record
                .bind_to(sqlx::query(&sql))
                .bind(location_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn count_records(
        &self,
        category: crate::models::Category,
        location_id: i64,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE location_id = ?1",
            category.table()
        ))
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Wait for in-flight queries and close every connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Make every weather insert whose forecast equals `forecast` abort
    #[cfg(test)]
    pub(crate) async fn fail_weather_inserts_of(&self, forecast: &str) {
        sqlx::query(&format!(
            "CREATE TRIGGER fail_weather BEFORE INSERT ON weather \
             WHEN NEW.forecast = '{forecast}' BEGIN SELECT RAISE(ABORT, 'rejected'); END"
        ))
        .execute(&self.pool)
        .await
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExplorerError;
    use crate::models::{Business, Category, DailyForecast, Trail};

    async fn memory_store() -> Store {
        Store::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn place() -> GeocodedPlace {
        GeocodedPlace {
            formatted_address: "Bellevue, WA 98005, USA".to_string(),
            latitude: 47.615_392,
            longitude: -122.171_172,
        }
    }

    fn forecast(summary: &str, day: &str) -> DailyForecast {
        DailyForecast {
            forecast: summary.to_string(),
            time: day.to_string(),
        }
    }

    #[tokio::test]
    async fn test_location_round_trip() {
        let store = memory_store().await;
        assert!(store.find_location("98005").await.unwrap().is_none());

        let stored = store.insert_location("98005", &place()).await.unwrap();
        assert_eq!(stored.search_query, "98005");
        assert_eq!(stored.formatted_query, "Bellevue, WA 98005, USA");

        let found = store.find_location("98005").await.unwrap();
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn test_insert_location_keeps_first_row() {
        let store = memory_store().await;
        let first = store.insert_location("98005", &place()).await.unwrap();

        let mut other = place();
        other.formatted_address = "Somewhere else".to_string();
        let second = store.insert_location("98005", &other).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_locations().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_records_read_back_in_insertion_order() {
        let store = memory_store().await;
        let location = store.insert_location("98005", &place()).await.unwrap();

        let batch = vec![
            forecast("Rain", "Mon Oct 15 2018"),
            forecast("Clouds", "Tue Oct 16 2018"),
            forecast("Sun", "Wed Oct 17 2018"),
        ];
        store.insert_records(location.id, &batch).await.unwrap();

        let stored: Vec<DailyForecast> = store.find_records(location.id).await.unwrap();
        assert_eq!(stored, batch);
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_location_and_category() {
        let store = memory_store().await;
        let here = store.insert_location("98005", &place()).await.unwrap();
        let there = store.insert_location("seattle", &place()).await.unwrap();

        store
            .insert_records(here.id, &[forecast("Rain", "Mon Oct 15 2018")])
            .await
            .unwrap();

        let elsewhere: Vec<DailyForecast> = store.find_records(there.id).await.unwrap();
        assert!(elsewhere.is_empty());
        let businesses: Vec<Business> = store.find_records(here.id).await.unwrap();
        assert!(businesses.is_empty());
    }

    #[tokio::test]
    async fn test_insert_is_not_an_upsert() {
        let store = memory_store().await;
        let location = store.insert_location("98005", &place()).await.unwrap();
        let batch = [forecast("Rain", "Mon Oct 15 2018")];

        store.insert_records(location.id, &batch).await.unwrap();
        store.insert_records(location.id, &batch).await.unwrap();

        assert_eq!(
            store
                .count_records(Category::Weather, location.id)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_optional_columns_round_trip() {
        let store = memory_store().await;
        let location = store.insert_location("98005", &place()).await.unwrap();
        let trail = Trail {
            name: "Cougar Mountain".to_string(),
            location: "Issaquah, Washington".to_string(),
            length: 5.4,
            stars: 4.5,
            star_votes: 12,
            summary: "Loop".to_string(),
            trail_url: "https://example.test/trail".to_string(),
            conditions: None,
            condition_date: None,
            condition_time: None,
        };

        store
            .insert_records(location.id, std::slice::from_ref(&trail))
            .await
            .unwrap();
        let stored: Vec<Trail> = store.find_records(location.id).await.unwrap();
        assert_eq!(stored, vec![trail]);
    }

    #[tokio::test]
    async fn test_unknown_location_reference_is_rejected() {
        let store = memory_store().await;
        let result = store
            .insert_records(42, &[forecast("Rain", "Mon Oct 15 2018")])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count_records(Category::Weather, 42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failure_midway_leaves_no_partial_batch() {
        let store = memory_store().await;
        let location = store.insert_location("98005", &place()).await.unwrap();
        store.fail_weather_inserts_of("boom").await;

        let result = store
            .insert_records(
                location.id,
                &[
                    forecast("Rain", "Mon Oct 15 2018"),
                    forecast("Clouds", "Tue Oct 16 2018"),
                    forecast("boom", "Wed Oct 17 2018"),
                ],
            )
            .await;

        assert!(matches!(result, Err(ExplorerError::Store { .. })));
        assert_eq!(
            store
                .count_records(Category::Weather, location.id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_find_location_by_id() {
        let store = memory_store().await;
        let location = store.insert_location("98005", &place()).await.unwrap();

        assert_eq!(
            store.find_location_by_id(location.id).await.unwrap(),
            Some(location)
        );
        assert_eq!(store.find_location_by_id(9_999).await.unwrap(), None);
    }
}
