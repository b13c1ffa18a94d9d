//! Playback position storage using SQLite.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media::MediaIdentity,
    store::PositionStore,
};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Row,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS playback_positions (
        identity TEXT PRIMARY KEY,
        position_ms INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed playback position store
///
/// Persists one resume offset per media identity:
/// - Single-row upserts, so each save is atomic per identity
/// - Last write wins on repeated saves
/// - Async operations on a connection pool
pub struct SqlitePositionStore {
    pool: SqlitePool,
}

impl SqlitePositionStore {
    /// Create a position store at the given database path, creating the
    /// file and parent directories as needed.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            BridgeError::StoreUnavailable(format!("Failed to connect to DB: {}", e))
        })?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| {
                BridgeError::StoreUnavailable(format!("Failed to create table: {}", e))
            })?;

        debug!(path = ?db_path, "Initialized position store");

        Ok(Self { pool })
    }

    /// Create an in-memory position store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:").await.map_err(|e| {
            BridgeError::StoreUnavailable(format!("Failed to connect to DB: {}", e))
        })?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| {
                BridgeError::StoreUnavailable(format!("Failed to create table: {}", e))
            })?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PositionStore for SqlitePositionStore {
    async fn save(&self, identity: &MediaIdentity, position: Duration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO playback_positions (identity, position_ms, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(identity) DO UPDATE SET
                position_ms = excluded.position_ms,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(identity.as_str())
        .bind(position.as_millis() as i64)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::StoreUnavailable(format!("Failed to save position: {}", e)))?;

        debug!(identity = %identity, position_ms = position.as_millis() as u64, "Saved position");
        Ok(())
    }

    async fn load(&self, identity: &MediaIdentity) -> Result<Option<Duration>> {
        let row = sqlx::query("SELECT position_ms FROM playback_positions WHERE identity = ?")
            .bind(identity.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::StoreUnavailable(format!("Failed to load position: {}", e))
            })?;

        match row {
            Some(row) => {
                let position_ms: i64 = row.get(0);
                // A non-positive offset carries no resume value; identical
                // to never having saved.
                if position_ms <= 0 {
                    return Ok(None);
                }
                debug!(identity = %identity, position_ms, "Loaded position");
                Ok(Some(Duration::from_millis(position_ms as u64)))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, identity: &MediaIdentity) -> Result<()> {
        sqlx::query("DELETE FROM playback_positions WHERE identity = ?")
            .bind(identity.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::StoreUnavailable(format!("Failed to delete position: {}", e))
            })?;

        debug!(identity = %identity, "Deleted position");
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM playback_positions")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::StoreUnavailable(format!("Failed to clear positions: {}", e))
            })?;

        debug!("Cleared all positions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_position_store_creation() {
        let _store = SqlitePositionStore::in_memory().await.unwrap();
        // Just verify it constructs
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = SqlitePositionStore::in_memory().await.unwrap();
        let identity = MediaIdentity::from("content://media/42");

        store
            .save(&identity, Duration::from_millis(5000))
            .await
            .unwrap();
        let loaded = store.load(&identity).await.unwrap();
        assert_eq!(loaded, Some(Duration::from_millis(5000)));
    }

    #[tokio::test]
    async fn test_unseen_identity_loads_none() {
        let store = SqlitePositionStore::in_memory().await.unwrap();
        let loaded = store
            .load(&MediaIdentity::from("never-saved"))
            .await
            .unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_saved_zero_loads_none() {
        let store = SqlitePositionStore::in_memory().await.unwrap();
        let identity = MediaIdentity::from("a.mp4");

        store.save(&identity, Duration::ZERO).await.unwrap();
        assert_eq!(store.load(&identity).await.unwrap(), None);
        // Zero normalizes away on read, as if never saved.
        assert!(!store.contains(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = SqlitePositionStore::in_memory().await.unwrap();
        let identity = MediaIdentity::from("a.mp4");

        store
            .save(&identity, Duration::from_millis(1000))
            .await
            .unwrap();
        store
            .save(&identity, Duration::from_millis(90_000))
            .await
            .unwrap();

        assert_eq!(
            store.load(&identity).await.unwrap(),
            Some(Duration::from_millis(90_000))
        );
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = SqlitePositionStore::in_memory().await.unwrap();
        let a = MediaIdentity::from("a.mp4");
        let b = MediaIdentity::from("b.mp4");

        store.save(&a, Duration::from_millis(1000)).await.unwrap();
        store.save(&b, Duration::from_millis(2000)).await.unwrap();

        store.delete(&a).await.unwrap();
        assert_eq!(store.load(&a).await.unwrap(), None);
        assert!(store.load(&b).await.unwrap().is_some());

        store.clear_all().await.unwrap();
        assert_eq!(store.load(&b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_positions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("positions.db");
        let identity = MediaIdentity::from("episode-7");

        {
            let store = SqlitePositionStore::new(db_path.clone()).await.unwrap();
            store
                .save(&identity, Duration::from_millis(95_000))
                .await
                .unwrap();
        }

        let store = SqlitePositionStore::new(db_path).await.unwrap();
        assert_eq!(
            store.load(&identity).await.unwrap(),
            Some(Duration::from_millis(95_000))
        );
    }
}
