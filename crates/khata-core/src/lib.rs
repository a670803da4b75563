//! # khata-core: Pure Business Logic for the Khata Back Office
//!
//! This crate is the shared core every Khata business module builds on:
//! id generation, GST arithmetic, pagination and the record types. It has
//! zero I/O dependencies; persistence lives in `khata-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khata Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    View layer (dashboard pages)                 │   │
//! │  │  Orders  Billing  Stock  Financial  GST  Staff  Attendance      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khata-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │    ids    │  │    gst    │  │pagination │  │  records  │  │   │
//! │  │   │ next_id   │  │compute_gst│  │ Paginator │  │ Order ... │  │   │
//! │  │   │IdGenerator│  │  Money    │  │  Query    │  │ filters   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              khata-db (Persisted Collection Store)              │   │
//! │  │          key-value storage, collections, config, seeding        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ids`] - Sequential `<PREFIX>-<NNN>` record ids
//! - [`gst`] - GST split into CGST/SGST or IGST
//! - [`money`] - Paise-based display amounts with Indian grouping
//! - [`pagination`] - Filtered, paged views over a collection
//! - [`query`] - Filter and sort descriptions applied before paging
//! - [`registry`] - Session-scoped paginators and payment methods
//! - [`records`] - The business records and their filters/sorts
//! - [`types`] - The `Record` contract, storage keys, strictness
//! - [`validation`] - Optional input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use khata_core::{compute_gst, next_id, Paginator};
//!
//! let id = next_id("ORD", ["ORD-0001", "ORD-0007"], 4);
//! assert_eq!(id, "ORD-0008");
//!
//! let tax = compute_gst(1000.0, 18.0, false);
//! assert_eq!(tax.total, 1180.0);
//! assert_eq!(tax.cgst, 90.0);
//!
//! let mut pages = Paginator::new(10);
//! pages.set_data((1..=23).collect::<Vec<u32>>());
//! assert_eq!(pages.total_pages(), 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gst;
pub mod ids;
pub mod money;
pub mod pagination;
pub mod query;
pub mod records;
pub mod registry;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use gst::{compute_gst, compute_gst_for, GstBreakdown, SupplyType};
pub use ids::{next_id, IdFormat, IdGenerator};
pub use money::Money;
pub use pagination::{PageInfo, PageLink, PageView, Paginator, DEFAULT_PAGE_SIZE};
pub use query::{DateRange, Query, RecordFilter, RecordSort, SortDirection};
pub use registry::{PaginatorRegistry, Session};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Application segment of every storage key (`khata_orders_v1`).
pub const DEFAULT_APP: &str = "khata";

/// Longest customer, item or staff name accepted by
/// [`validation::validate_name`].
pub const MAX_NAME_LENGTH: usize = 200;
