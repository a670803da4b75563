//! # Repository Module
//!
//! Typed access to the business collections.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.collection::<Order>()                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Collection<Order>                                                      │
//! │  ├── all / get / count / page / refresh                                 │
//! │  ├── create(|id| Order::new(id, ..))                                    │
//! │  ├── update / try_update / delete / replace_all                         │
//! │       │                                                                 │
//! │       │  whole-collection load → mutate → save                          │
//! │       ▼                                                                 │
//! │  CollectionStore ──► KeyValueStorage (SQLite or memory)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One generic repository serves every collection; the record type supplies
//! its key module, id prefix and id width through [`khata_core::Record`].

pub mod collection;

pub use collection::Collection;
