//! In-process storage for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use super::{check_quota, entry_size, KeyValueStorage};
use crate::error::{DbError, DbResult};

/// A `BTreeMap` behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps total stored bytes.
    pub fn with_quota(quota: usize) -> Self {
        MemoryStorage {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail, to exercise write-failure paths.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Stores a raw value without any checks, e.g. to plant corrupt data.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(DbError::Internal("storage is read-only".to_string()));
        }

        let mut entries = self.entries.write().await;
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum();
        check_quota(self.quota, key, value, others)?;

        trace!(key, bytes = value.len(), "memory set");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(DbError::Internal("storage is read-only".to_string()));
        }
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> DbResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn used_bytes(&self) -> DbResult<usize> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(k, v)| entry_size(k, v))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("a").await.unwrap(), None);

        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        storage.set("a", "3").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(storage.used_bytes().await.unwrap(), 4);

        assert!(storage.remove("a").await.unwrap());
        assert!(!storage.remove("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_quota_keeps_previous_value() {
        let storage = MemoryStorage::with_quota(12);
        storage.set("key", "12345").await.unwrap();

        // Replacing a value only counts the new size for that key.
        storage.set("key", "123456789").await.unwrap();

        let err = storage.set("key", "1234567890").await.unwrap_err();
        assert!(matches!(err, DbError::QuotaExceeded { .. }));
        assert_eq!(storage.get("key").await.unwrap().as_deref(), Some("123456789"));
    }

    #[tokio::test]
    async fn test_read_only() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").await.unwrap();
        storage.set_read_only(true);
        assert!(storage.set("k", "w").await.is_err());
        assert!(storage.remove("k").await.is_err());
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
