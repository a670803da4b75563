//! Per-collection write locks.
//!
//! Every mutation is load → mutate → save over the whole collection. Two
//! overlapping mutations of the same key would each save a copy missing the
//! other's change, so they are serialized by a mutex per key. Different keys
//! never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutexes, one per storage key.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`. Released when the guard drops.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of keys that have been locked at least once.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = LockRegistry::new();
        let guard = locks.acquire("khata_orders_v1").await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.acquire("khata_orders_v1").await;
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = LockRegistry::new();
        let _orders = locks.acquire("khata_orders_v1").await;
        let _stock = locks.acquire("khata_stock_v1").await;
        assert_eq!(locks.len().await, 2);
    }
}
