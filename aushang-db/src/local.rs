use sqlx::{
    SqlitePool, query, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

pub type Result<T, E = sqlx::Error> = std::result::Result<T, E>;

/// A string-keyed store of string values, persisted in SQLite.
#[derive(Clone, Debug)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `url`, creating the file if necessary.
    ///
    /// A single connection is kept alive for the life of the pool, so
    /// `sqlite::memory:` behaves as one database rather than one per connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        query(
            "
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        query_scalar(
            "
            SELECT
                local_storage.value
            FROM
                local_storage
            WHERE
                local_storage.key = ?
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        query(
            "
            INSERT INTO local_storage (key, value)
            VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns whether a value was stored under `key`.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
