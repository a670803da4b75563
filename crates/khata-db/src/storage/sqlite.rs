//! SQLite-backed storage on the `kv_store` table.
//!
//! ```text
//! kv_store
//! ┌──────────────────┬───────────────────────────┬──────────────────────┐
//! │ key (PK)         │ value                     │ updated_at           │
//! ├──────────────────┼───────────────────────────┼──────────────────────┤
//! │ khata_orders_v1  │ [{"id":"ORD-0001",...}]   │ 2024-03-01T09:30:00Z │
//! │ khata_stock_v1   │ [{"id":"STK-001",...}]    │ 2024-03-01T09:31:12Z │
//! └──────────────────┴───────────────────────────┴──────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use super::{check_quota, KeyValueStorage};
use crate::error::DbResult;

/// Bytes used by every entry except `?1`.
const BYTES_EXCLUDING: &str = r#"
    SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
    FROM kv_store
    WHERE key != ?1
"#;

/// Storage on a shared SQLite pool.
///
/// With a quota set, the usage check and the write run in one transaction
/// under a storage-wide lock, so writes to different keys cannot both pass
/// the check and together exceed the quota.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    quota: Option<usize>,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteStorage {
    /// Creates storage over a pool whose schema is already migrated.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStorage {
            pool,
            quota: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    async fn bytes_excluding(&self, key: &str) -> DbResult<usize> {
        let used: i64 = sqlx::query_scalar(BYTES_EXCLUDING)
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(used).unwrap_or(0))
    }
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let _guard = match self.quota {
            Some(_) => Some(self.write_lock.lock().await),
            None => None,
        };
        let mut tx = self.pool.begin().await?;

        if self.quota.is_some() {
            let used: i64 = sqlx::query_scalar(BYTES_EXCLUDING)
                .bind(key)
                .fetch_one(&mut *tx)
                .await?;
            let others = usize::try_from(used).unwrap_or(0);
            check_quota(self.quota, key, value, others)?;
        }

        debug!(key, bytes = value.len(), "Writing kv_store entry");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    async fn used_bytes(&self) -> DbResult<usize> {
        // No key equals the empty string, so this counts every entry.
        self.bytes_excluding("").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    async fn storage(quota: Option<usize>) -> SqliteStorage {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteStorage::new(db.pool().clone()).with_quota(quota)
    }

    #[tokio::test]
    async fn test_upsert_and_keys() {
        let s = storage(None).await;
        assert_eq!(s.get("khata_orders_v1").await.unwrap(), None);

        s.set("khata_orders_v1", "[]").await.unwrap();
        s.set("khata_orders_v1", r#"[{"id":"ORD-0001"}]"#).await.unwrap();
        s.set("khata_billing_v1", "[]").await.unwrap();

        assert_eq!(
            s.get("khata_orders_v1").await.unwrap().as_deref(),
            Some(r#"[{"id":"ORD-0001"}]"#)
        );
        assert_eq!(s.keys().await.unwrap(), vec!["khata_billing_v1", "khata_orders_v1"]);

        assert!(s.remove("khata_billing_v1").await.unwrap());
        assert!(!s.remove("khata_billing_v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_quota() {
        let s = storage(Some(20)).await;
        s.set("k", "0123456789").await.unwrap();
        assert_eq!(s.used_bytes().await.unwrap(), 11);

        let err = s.set("other", "0123456789").await.unwrap_err();
        assert!(matches!(err, DbError::QuotaExceeded { needed: 26, limit: 20, .. }));
        assert_eq!(s.get("other").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_respect_quota() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let s = Arc::new(SqliteStorage::new(db.pool().clone()).with_quota(Some(100)));

        // Each entry takes 80 bytes, so only one of them fits.
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let s = s.clone();
                tokio::spawn(async move { s.set(&format!("key{n:02}"), &"x".repeat(75)).await })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => stored += 1,
                Err(e) => assert!(matches!(e, DbError::QuotaExceeded { .. })),
            }
        }
        assert_eq!(stored, 1);
        assert_eq!(s.keys().await.unwrap().len(), 1);
        assert!(s.used_bytes().await.unwrap() <= 100);
    }

    #[tokio::test]
    async fn test_unicode_counts_bytes() {
        let s = storage(None).await;
        s.set("k", "₹").await.unwrap();
        assert_eq!(s.used_bytes().await.unwrap(), 1 + "₹".len());
    }
}
