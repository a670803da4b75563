//! # Session Registry
//!
//! Explicit, session-scoped home for per-collection pagination state and the
//! configured payment methods. Modules receive a `&mut Session` instead of
//! reaching for process-wide globals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session (lives as long as the application session)                     │
//! │  ├── paginators: PaginatorRegistry                                      │
//! │  │     "orders"  ──► Paginator<Order>                                   │
//! │  │     "stock"   ──► Paginator<StockItem>                               │
//! │  │     "billing" ──► Paginator<Invoice>                                 │
//! │  ├── payment_methods: [Cash, Upi, ...]                                  │
//! │  └── default_page_size                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::any::Any;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::pagination::{Paginator, DEFAULT_PAGE_SIZE};
use crate::types::{PaymentMethod, Record};

// =============================================================================
// Paginator Registry
// =============================================================================

/// One paginator per collection name, each typed by its record.
#[derive(Default)]
pub struct PaginatorRegistry {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl PaginatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the paginator registered under `name`, creating it with
    /// `page_size` on first use.
    ///
    /// ## Errors
    /// [`CoreError::RegistryTypeMismatch`] if `name` already holds a
    /// paginator for a different record type.
    pub fn get_or_create<T>(&mut self, name: &str, page_size: usize) -> CoreResult<&mut Paginator<T>>
    where
        T: Send + 'static,
    {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| Box::new(Paginator::<T>::new(page_size)) as Box<dyn Any + Send>)
            .downcast_mut::<Paginator<T>>()
            .ok_or_else(|| CoreError::RegistryTypeMismatch {
                name: name.to_string(),
            })
    }

    /// Returns the paginator for a record type's collection, keyed by its
    /// module name.
    pub fn for_record<T: Record>(&mut self, page_size: usize) -> CoreResult<&mut Paginator<T>> {
        self.get_or_create(T::COLLECTION.module, page_size)
    }

    /// Returns an existing paginator. `None` if absent or typed differently.
    pub fn get<T: Send + 'static>(&self, name: &str) -> Option<&Paginator<T>> {
        self.entries.get(name)?.downcast_ref::<Paginator<T>>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Drops the paginator for `name`. Returns true if one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered collection names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for PaginatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatorRegistry")
            .field("collections", &self.names())
            .finish()
    }
}

// =============================================================================
// Session
// =============================================================================

/// State owned by one application session.
#[derive(Debug)]
pub struct Session {
    paginators: PaginatorRegistry,
    payment_methods: Vec<PaymentMethod>,
    default_page_size: usize,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Starts a session with every payment method enabled.
    pub fn new(default_page_size: usize) -> Self {
        Session {
            paginators: PaginatorRegistry::new(),
            payment_methods: PaymentMethod::ALL.to_vec(),
            default_page_size: default_page_size.max(1),
            started_at: Utc::now(),
        }
    }

    /// Restricts the payment methods offered in forms.
    pub fn with_payment_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.payment_methods = methods;
        self
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn accepts(&self, method: PaymentMethod) -> bool {
        self.payment_methods.contains(&method)
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn paginators(&self) -> &PaginatorRegistry {
        &self.paginators
    }

    pub fn paginators_mut(&mut self) -> &mut PaginatorRegistry {
        &mut self.paginators
    }

    /// The paginator for a record type, created with the session's default
    /// page size on first use.
    pub fn paginator<T: Record>(&mut self) -> CoreResult<&mut Paginator<T>> {
        let size = self.default_page_size;
        self.paginators.for_record::<T>(size)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(DEFAULT_PAGE_SIZE)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Order, StockItem};

    #[test]
    fn test_get_or_create_reuses_instance() {
        let mut reg = PaginatorRegistry::new();
        {
            let p = reg.get_or_create::<u32>("numbers", 5).unwrap();
            p.set_data((1..=12).collect());
            p.go_to_page(3);
        }

        let p = reg.get_or_create::<u32>("numbers", 99).unwrap();
        assert_eq!(p.current_page(), 3);
        assert_eq!(p.items_per_page(), 5);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let mut reg = PaginatorRegistry::new();
        reg.get_or_create::<u32>("orders", 10).unwrap();
        let err = reg.get_or_create::<String>("orders", 10).unwrap_err();
        assert!(matches!(err, CoreError::RegistryTypeMismatch { .. }));
        assert!(reg.get::<String>("orders").is_none());
        assert!(reg.get::<u32>("orders").is_some());
    }

    #[test]
    fn test_remove_and_names() {
        let mut reg = PaginatorRegistry::new();
        reg.get_or_create::<u32>("stock", 10).unwrap();
        reg.get_or_create::<u32>("billing", 10).unwrap();
        assert_eq!(reg.names(), vec!["billing", "stock"]);
        assert!(reg.remove("stock"));
        assert!(!reg.remove("stock"));
        assert!(!reg.contains("stock"));
    }

    #[test]
    fn test_session_paginators_by_record_type() {
        let mut session = Session::new(25);
        assert_eq!(session.paginator::<Order>().unwrap().items_per_page(), 25);
        session.paginator::<StockItem>().unwrap();
        assert_eq!(session.paginators().names(), vec!["orders", "stock"]);
    }

    #[test]
    fn test_session_payment_methods() {
        let session = Session::default()
            .with_payment_methods(vec![PaymentMethod::Cash, PaymentMethod::Upi]);
        assert!(session.accepts(PaymentMethod::Upi));
        assert!(!session.accepts(PaymentMethod::Cheque));
        assert_eq!(session.default_page_size(), DEFAULT_PAGE_SIZE);
    }
}
