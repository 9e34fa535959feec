use std::str::FromStr;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool};

use crate::persistence::{SnapshotPersistence, StorageError};

pub(crate) const SCHEMA: &str = include_str!("../sql/schema.sql");

pub async fn connect_pool(data_folder: &str) -> Result<SqlitePool, sqlx::Error> {
    let db_path = format!("{}/sqlitedata", data_folder);
    std::fs::create_dir_all(&db_path)?;

    let db_filename = format!("{}/advisor.db", db_path);

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_filename))?
        .create_if_missing(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .busy_timeout(StdDuration::from_secs(30));

    let pool = SqlitePool::connect_with(options).await?;

    sqlx::query(SCHEMA).execute(&pool).await?;
    Ok(pool)
}

/// Snapshot kept as one row in a SQLite key/value table. Same contract as the
/// JSON file backend, for deployments that already carry a database.
pub struct SqlitePersistence {
    pool: SqlitePool,
    key: String,
}

impl SqlitePersistence {
    pub fn new(pool: SqlitePool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SnapshotPersistence for SqlitePersistence {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        let value =
            sqlx::query_scalar::<_, String>("SELECT value FROM snapshots WHERE key = ?")
                .bind(&self.key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn save(&self, snapshot: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
                INSERT INTO snapshots (key, value, updated_at) VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.key)
        .bind(snapshot)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        // One connection only: each sqlite::memory: connection is its own db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn load_before_save_is_none() {
        let p = SqlitePersistence::new(memory_pool().await, "prediction_logs");
        assert!(p.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let p = SqlitePersistence::new(memory_pool().await, "prediction_logs");
        p.save(r#"[{"date":"2024-01-15"}]"#).await.unwrap();
        assert_eq!(
            p.load().await.unwrap().unwrap(),
            r#"[{"date":"2024-01-15"}]"#
        );
    }

    #[tokio::test]
    async fn second_save_replaces_the_record() {
        let p = SqlitePersistence::new(memory_pool().await, "prediction_logs");
        p.save("[1]").await.unwrap();
        p.save("[2]").await.unwrap();
        assert_eq!(p.load().await.unwrap().unwrap(), "[2]");
    }

    #[tokio::test]
    async fn keys_are_namespaced() {
        let pool = memory_pool().await;
        let a = SqlitePersistence::new(pool.clone(), "a");
        let b = SqlitePersistence::new(pool, "b");
        a.save("[\"a\"]").await.unwrap();
        assert!(b.load().await.unwrap().is_none());
    }
}
