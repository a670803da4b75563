//! # Collection Store
//!
//! Loads and saves whole collections (ordered JSON arrays) under namespaced
//! keys.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(key, default)                                                     │
//! │    absent ───────────────► default                                      │
//! │    present, valid ───────► decoded records                              │
//! │    present, corrupt ─────► warn! + default     (never an error)         │
//! │    storage unreadable ───► error! + default    (never an error)         │
//! │                                                                         │
//! │  save(key, records)                                                     │
//! │    ok ───────────────────► value replaced                               │
//! │    quota / write error ──► error! ; previous value kept (never an error)│
//! │                                                                         │
//! │  try_load / try_save: same operations, errors returned to the caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key is created by its first save and is only ever removed through
//! [`CollectionStore::clear`].

use std::sync::Arc;

use khata_core::CollectionKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use crate::error::{DbError, DbResult};
use crate::locks::LockRegistry;
use crate::storage::KeyValueStorage;

/// Whole-collection persistence over any [`KeyValueStorage`].
#[derive(Debug, Clone)]
pub struct CollectionStore {
    storage: Arc<dyn KeyValueStorage>,
    locks: LockRegistry,
}

impl CollectionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        CollectionStore {
            storage,
            locks: LockRegistry::new(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Exclusive access to `key` for a load → mutate → save cycle.
    pub async fn lock(&self, key: &CollectionKey) -> OwnedMutexGuard<()> {
        self.locks.acquire(&key.to_string()).await
    }

    // =========================================================================
    // Tolerant operations
    // =========================================================================

    /// Loads the collection, falling back to `default` when it is absent,
    /// corrupt or unreadable. Never fails.
    pub async fn load<T>(&self, key: &CollectionKey, default: Vec<T>) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        match self.try_load(key).await {
            Ok(Some(records)) => records,
            Ok(None) => default,
            Err(DbError::CorruptData { key, reason }) => {
                warn!(%key, %reason, "Stored collection is corrupt, using default");
                default
            }
            Err(e) => {
                error!(%key, error = %e, "Failed to read collection, using default");
                default
            }
        }
    }

    /// [`load`](Self::load) with an empty default.
    pub async fn load_or_empty<T>(&self, key: &CollectionKey) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        self.load(key, Vec::new()).await
    }

    /// Replaces the stored collection. Failures are logged and the previous
    /// value stays in place. Returns whether the write happened.
    pub async fn save<T>(&self, key: &CollectionKey, records: &[T]) -> bool
    where
        T: Serialize,
    {
        match self.try_save(key, records).await {
            Ok(()) => true,
            Err(e) => {
                error!(%key, count = records.len(), error = %e, "Failed to save collection");
                false
            }
        }
    }

    // =========================================================================
    // Strict operations
    // =========================================================================

    /// Loads the collection. `Ok(None)` when the key has never been saved.
    ///
    /// ## Errors
    /// - [`DbError::CorruptData`] when the stored value is not a JSON array
    ///   of `T`
    /// - storage errors from the backend
    pub async fn try_load<T>(&self, key: &CollectionKey) -> DbResult<Option<Vec<T>>>
    where
        T: DeserializeOwned,
    {
        let key_str = key.to_string();
        let Some(raw) = self.storage.get(&key_str).await? else {
            debug!(key = %key_str, "Collection not stored yet");
            return Ok(None);
        };

        let records: Vec<T> =
            serde_json::from_str(&raw).map_err(|e| DbError::corrupt(key_str.clone(), e))?;
        debug!(key = %key_str, count = records.len(), "Loaded collection");
        Ok(Some(records))
    }

    /// Serializes and writes the whole collection.
    ///
    /// ## Errors
    /// Serialization, quota and storage errors. On error the stored value is
    /// unchanged.
    pub async fn try_save<T>(&self, key: &CollectionKey, records: &[T]) -> DbResult<()>
    where
        T: Serialize,
    {
        let key_str = key.to_string();
        let raw = serde_json::to_string(records)?;
        self.storage.set(&key_str, &raw).await?;
        debug!(key = %key_str, count = records.len(), bytes = raw.len(), "Saved collection");
        Ok(())
    }

    /// Removes the collection entirely. Returns true if it existed.
    pub async fn clear(&self, key: &CollectionKey) -> DbResult<bool> {
        let _guard = self.lock(key).await;
        let removed = self.storage.remove(&key.to_string()).await?;
        info!(%key, removed, "Cleared collection");
        Ok(removed)
    }

    /// Every stored key that follows the collection key schema. Other keys
    /// are skipped.
    pub async fn collection_keys(&self) -> DbResult<Vec<CollectionKey>> {
        let keys = self.storage.keys().await?;
        Ok(keys.iter().filter_map(|k| k.parse().ok()).collect())
    }
}
