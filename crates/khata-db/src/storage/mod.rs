//! # Key-Value Storage
//!
//! The raw string store underneath every collection, the browser
//! `localStorage` analogue.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CollectionStore (JSON arrays)                                          │
//! │        │  get / set / remove / keys                                     │
//! │        ▼                                                                │
//! │  Arc<dyn KeyValueStorage>                                               │
//! │        ├── MemoryStorage  (tests, ephemeral sessions)                   │
//! │        └── SqliteStorage  (kv_store table, survives restarts)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends accept an optional byte quota. Usage is counted as
//! `len(key) + len(value)` over every entry; a write that would exceed the
//! quota fails with [`DbError::QuotaExceeded`](crate::DbError::QuotaExceeded)
//! and leaves the previous value in place.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::{DbError, DbResult};

/// String key to string value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug {
    /// Returns the raw value stored under `key`, if any.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Returns true if it existed.
    async fn remove(&self, key: &str) -> DbResult<bool>;

    /// Every stored key, sorted.
    async fn keys(&self) -> DbResult<Vec<String>>;

    /// Bytes currently counted against the quota.
    async fn used_bytes(&self) -> DbResult<usize>;
}

/// Bytes one entry counts against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Rejects a write when `others + entry` would pass `quota`.
pub(crate) fn check_quota(
    quota: Option<usize>,
    key: &str,
    value: &str,
    others: usize,
) -> DbResult<()> {
    match quota {
        Some(limit) => {
            let needed = others + entry_size(key, value);
            if needed > limit {
                return Err(DbError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quota() {
        assert!(check_quota(None, "k", "vvvv", usize::MAX - 10).is_ok());
        assert!(check_quota(Some(10), "k", "vvvv", 5).is_ok());
        let err = check_quota(Some(10), "k", "vvvvv", 5).unwrap_err();
        assert!(matches!(err, DbError::QuotaExceeded { needed: 11, limit: 10, .. }));
    }
}
