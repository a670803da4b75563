//! # khata-db: Persisted Collection Store for Khata
//!
//! Everything in Khata that touches storage. Business collections (orders,
//! invoices, stock, ledger, GST filings, staff, attendance) are each kept
//! as one JSON array under a versioned key such as `khata_orders_v1`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khata Data Flow                                  │
//! │                                                                         │
//! │  Dashboard table (orders page)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     khata-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────────┐   ┌─────────────────┐   ┌────────────────┐   │    │
//! │  │   │ Collection<T>│──►│ CollectionStore │──►│ KeyValueStorage│   │    │
//! │  │   │ (repository) │   │ (store.rs)      │   │ SQLite/memory  │   │    │
//! │  │   │ create/update│   │ load/save JSON  │   │ get/set/remove │   │    │
//! │  │   └──────────────┘   │ LockRegistry    │   └────────────────┘   │    │
//! │  │                      └─────────────────┘                        │    │
//! │  │   KhataConfig (config.rs)      Database + migrations (pool.rs)  │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite kv_store table                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML + environment configuration
//! - [`pool`] - Connection pool and handles
//! - [`migrations`] - Embedded database migrations
//! - [`storage`] - Key-value backends
//! - [`store`] - Whole-collection load/save
//! - [`locks`] - Per-collection write locks
//! - [`repository`] - Typed collection repositories
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khata_core::records::{Order, OrderFilter, OrderSort};
//! use khata_core::Query;
//! use khata_db::{Database, KhataConfig};
//!
//! let config = KhataConfig::load_or_default(None);
//! let db = Database::new(config.db_config()).await?;
//!
//! let orders = db.collection::<Order>(&config.namespace()?, config.strictness());
//! let order = orders.create(|id| Order::new(id, "Sharma Traders", items, 18.0, today)).await?;
//!
//! let query = Query::from_parts(OrderFilter::default(), OrderSort::Newest);
//! let page = orders.page(&query, config.ui.page_size).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod locks;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod storage;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::KhataConfig;
pub use error::{DbError, DbResult};
pub use locks::LockRegistry;
pub use pool::{Database, DbConfig};
pub use repository::Collection;
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::CollectionStore;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber for binaries.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - everything at debug
/// - `RUST_LOG=khata=trace` - trace for khata crates only
/// - Default: `info,khata=debug,sqlx=warn`
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,khata=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
