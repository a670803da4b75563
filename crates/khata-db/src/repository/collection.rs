//! # Collection Repository
//!
//! Typed CRUD over one business collection.
//!
//! ## Mutation Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update / delete / replace_all                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock(key) ─── serializes mutations of this collection                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load whole collection                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mutate in memory  (create: IdGenerator picks the next id)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save whole collection                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  caller re-derives its page view (refresh / page)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strictness
//! - **Lenient**: reads never fail (corrupt data reads as empty) and failed
//!   writes are logged; the in-memory result is still returned, exactly
//!   like the browser dashboard this replaces. A mutation whose load hits a
//!   backend error is refused instead of saving over records it never saw.
//! - **Strict**: corrupt data, malformed ids and failed writes are errors.

use std::marker::PhantomData;

use chrono::Utc;
use khata_core::{
    CollectionKey, CoreError, IdGenerator, KeyNamespace, Paginator, Query, Record, Strictness,
};
use tracing::{debug, error, info, warn};

use crate::error::{DbError, DbResult};
use crate::store::CollectionStore;

/// Repository for one record type's collection.
#[derive(Debug, Clone)]
pub struct Collection<T: Record> {
    store: CollectionStore,
    key: CollectionKey,
    ids: IdGenerator,
    strictness: Strictness,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Creates the repository for `T` under `namespace`.
    pub fn new(store: CollectionStore, namespace: &KeyNamespace, strictness: Strictness) -> Self {
        Collection {
            store,
            key: namespace.key_for::<T>(),
            ids: IdGenerator::for_record::<T>().with_strictness(strictness),
            strictness,
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &CollectionKey {
        &self.key
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record, in stored order.
    pub async fn all(&self) -> DbResult<Vec<T>> {
        match self.strictness {
            Strictness::Lenient => Ok(self.store.load_or_empty(&self.key).await),
            Strictness::Strict => Ok(self.store.try_load(&self.key).await?.unwrap_or_default()),
        }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.all().await?.into_iter().find(|r| r.id() == id))
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.all().await?.len())
    }

    /// The id the next [`create`](Self::create) would assign.
    pub async fn peek_next_id(&self) -> DbResult<String> {
        let records = self.all().await?;
        Ok(self.ids.next_for(&records)?)
    }

    /// Loads the collection into a fresh paginator with `query` applied.
    pub async fn page(&self, query: &Query<'_, T>, page_size: usize) -> DbResult<Paginator<T>> {
        let mut paginator = Paginator::new(page_size);
        self.refresh(&mut paginator, query).await?;
        Ok(paginator)
    }

    /// Reloads `paginator` after a mutation and re-applies `query`. The
    /// paginator returns to page 1.
    pub async fn refresh(&self, paginator: &mut Paginator<T>, query: &Query<'_, T>) -> DbResult<()> {
        paginator.set_data(self.all().await?);
        paginator.apply_query(query);
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Assigns the next sequential id, builds the record with it and
    /// appends it.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let order = db.collection::<Order>()
    ///     .create(|id| Order::new(id, "Sharma Traders", items, 18.0, today))
    ///     .await?;
    /// assert_eq!(order.id, "ORD-0001");
    /// ```
    ///
    /// ## Errors
    /// - [`CoreError::MalformedId`] (strict) if an existing id is malformed
    /// - [`DbError::Duplicate`] if the builder ignored the id and reused an
    ///   existing one
    pub async fn create<F>(&self, build: F) -> DbResult<T>
    where
        F: FnOnce(String) -> T,
    {
        let _guard = self.store.lock(&self.key).await;
        let mut records = self.load_for_update().await?;

        let id = self.ids.next_for(&records)?;
        let record = build(id);
        self.ensure_unique(&records, record.id())?;

        info!(key = %self.key, id = %record.id(), "Creating record");
        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    /// Appends a record that already carries its id (imports, restores).
    pub async fn insert(&self, record: T) -> DbResult<T> {
        let _guard = self.store.lock(&self.key).await;
        let mut records = self.load_for_update().await?;
        self.ensure_unique(&records, record.id())?;

        debug!(key = %self.key, id = %record.id(), "Inserting record");
        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    /// Applies `change` to the record with `id` and stamps `updated_at`.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if no record has `id`
    /// - [`CoreError::InvalidState`] if `change` altered the id
    pub async fn update<F>(&self, id: &str, change: F) -> DbResult<T>
    where
        F: FnOnce(&mut T),
    {
        let _guard = self.store.lock(&self.key).await;
        let mut records = self.load_for_update().await?;

        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| DbError::not_found(T::COLLECTION.module, id))?;
        change(record);
        if record.id() != id {
            return Err(CoreError::InvalidState {
                record: id.to_string(),
                state: "stored".to_string(),
                action: "change its id".to_string(),
            }
            .into());
        }
        record.touch(Utc::now());
        let updated = record.clone();

        info!(key = %self.key, id, "Updating record");
        self.persist(&records).await?;
        Ok(updated)
    }

    /// Like [`update`](Self::update) for changes that can be rejected by a
    /// business rule (e.g. issuing more stock than is on hand). Nothing is
    /// saved when `change` fails.
    pub async fn try_update<F>(&self, id: &str, change: F) -> DbResult<T>
    where
        F: FnOnce(&mut T) -> Result<(), CoreError>,
    {
        let _guard = self.store.lock(&self.key).await;
        let mut records = self.load_for_update().await?;

        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| DbError::not_found(T::COLLECTION.module, id))?;
        let mut draft = record.clone();
        change(&mut draft)?;
        if draft.id() != id {
            return Err(CoreError::InvalidState {
                record: id.to_string(),
                state: "stored".to_string(),
                action: "change its id".to_string(),
            }
            .into());
        }
        draft.touch(Utc::now());
        *record = draft.clone();

        info!(key = %self.key, id, "Updating record");
        self.persist(&records).await?;
        Ok(draft)
    }

    /// Removes the record with `id`, returning it if it existed.
    pub async fn delete(&self, id: &str) -> DbResult<Option<T>> {
        let _guard = self.store.lock(&self.key).await;
        let mut records = self.load_for_update().await?;

        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            debug!(key = %self.key, id, "Delete of missing record ignored");
            return Ok(None);
        };
        let removed = records.remove(pos);

        info!(key = %self.key, id, "Deleting record");
        self.persist(&records).await?;
        Ok(Some(removed))
    }

    /// Replaces the whole collection.
    ///
    /// ## Errors
    /// [`DbError::Duplicate`] if two records share an id; nothing is saved.
    pub async fn replace_all(&self, records: Vec<T>) -> DbResult<()> {
        let _guard = self.store.lock(&self.key).await;
        for (i, record) in records.iter().enumerate() {
            self.ensure_unique(&records[..i], record.id())?;
        }

        info!(key = %self.key, count = records.len(), "Replacing collection");
        self.persist(&records).await
    }

    /// Removes the collection from storage.
    pub async fn clear(&self) -> DbResult<bool> {
        self.store.clear(&self.key).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Loads the collection for a load → mutate → save cycle. Corrupt data
    /// reads as empty under lenient strictness; any other storage error is
    /// returned so the cycle never saves over records it could not read.
    async fn load_for_update(&self) -> DbResult<Vec<T>> {
        match self.store.try_load(&self.key).await {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(DbError::CorruptData { key, reason }) if self.strictness == Strictness::Lenient => {
                warn!(%key, %reason, "Stored collection is corrupt, rebuilding from empty");
                Ok(Vec::new())
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to read collection, mutation skipped");
                Err(e)
            }
        }
    }

    fn ensure_unique(&self, records: &[T], id: &str) -> DbResult<()> {
        if records.iter().any(|r| r.id() == id) {
            return Err(DbError::duplicate(T::COLLECTION.module, id));
        }
        Ok(())
    }

    async fn persist(&self, records: &[T]) -> DbResult<()> {
        match self.strictness {
            Strictness::Strict => self.store.try_save(&self.key, records).await,
            Strictness::Lenient => {
                self.store.save(&self.key, records).await;
                Ok(())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
