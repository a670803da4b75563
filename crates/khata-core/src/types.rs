//! # Shared Types
//!
//! Types every business module shares: the [`Record`] contract, the
//! per-collection conventions, the storage key schema and the
//! strict/lenient policy switch.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shared Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Record (trait) │   │ CollectionSpec  │   │ CollectionKey   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id()           │──►│  module         │──►│  khata_orders_v1│       │
//! │  │  COLLECTION     │   │  prefix, width  │   │  (app,module,N) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   Strictness    │   │ PaymentMethod   │                              │
//! │  │  Lenient/Strict │   │  Cash, Upi, ... │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::ids::IdFormat;

// =============================================================================
// Strictness
// =============================================================================

/// How the core reacts to malformed input it could otherwise tolerate.
///
/// ## Policy
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LENIENT (default)                  │  STRICT                           │
/// │  ───────────────────                │  ──────                           │
/// │  • Malformed ids count as 0         │  • Malformed ids are an error     │
/// │  • Corrupt stored data → default    │  • Corrupt stored data is an error│
/// │  • Failed writes are logged only    │  • Failed writes propagate        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    #[default]
    Lenient,
    Strict,
}

impl Strictness {
    /// Returns true for [`Strictness::Strict`].
    pub fn is_strict(&self) -> bool {
        matches!(self, Strictness::Strict)
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strictness::Lenient => write!(f, "lenient"),
            Strictness::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for Strictness {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" | "false" | "0" => Ok(Strictness::Lenient),
            "strict" | "true" | "1" => Ok(Strictness::Strict),
            other => Err(ValidationError::InvalidFormat {
                field: "strictness".to_string(),
                reason: format!("unknown value '{}', expected lenient or strict", other),
            }),
        }
    }
}

// =============================================================================
// Collection Spec
// =============================================================================

/// Per-collection conventions: storage module name and id format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Module segment of the storage key (`orders` in `khata_orders_v1`).
    pub module: &'static str,
    /// Id prefix (`ORD` in `ORD-0007`).
    pub prefix: &'static str,
    /// Zero-padded digit width of the id number.
    pub width: usize,
}

impl CollectionSpec {
    pub const fn new(module: &'static str, prefix: &'static str, width: usize) -> Self {
        CollectionSpec {
            module,
            prefix,
            width,
        }
    }

    /// Returns the id format for this collection.
    pub fn id_format(&self) -> IdFormat {
        IdFormat::new(self.prefix, self.width)
    }
}

// =============================================================================
// Record
// =============================================================================

/// A business entity stored in a collection.
///
/// ## Invariants
/// - `id()` is unique within the collection
/// - `id()` never changes once assigned
///
/// ## Example
/// ```rust
/// use khata_core::{CollectionSpec, Record};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Note {
///     id: String,
///     text: String,
/// }
///
/// impl Record for Note {
///     const COLLECTION: CollectionSpec = CollectionSpec::new("notes", "NOTE", 3);
///
///     fn id(&self) -> &str {
///         &self.id
///     }
/// }
///
/// assert_eq!(Note::COLLECTION.id_format().render(7), "NOTE-007");
/// ```
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection conventions for this record type.
    const COLLECTION: CollectionSpec;

    /// The record's unique, immutable id.
    fn id(&self) -> &str;

    /// Stamps a modification time. Records without timestamps ignore it.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

// =============================================================================
// Collection Keys
// =============================================================================

/// Application namespace for storage keys: `<app>_<module>_v<version>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNamespace {
    pub app: String,
    pub version: u32,
}

impl KeyNamespace {
    /// Creates a namespace, validating the app segment.
    pub fn new(app: impl Into<String>, version: u32) -> Result<Self, ValidationError> {
        let app = app.into();
        validate_key_segment("app", &app)?;
        if version == 0 {
            return Err(ValidationError::OutOfRange {
                field: "key version".to_string(),
                min: 1.0,
                max: u32::MAX as f64,
            });
        }
        Ok(KeyNamespace { app, version })
    }

    /// Derives the key for a module in this namespace.
    pub fn key(&self, module: &str) -> CollectionKey {
        CollectionKey {
            app: self.app.clone(),
            module: module.to_string(),
            version: self.version,
        }
    }

    /// Derives the key for a record type's collection.
    pub fn key_for<T: Record>(&self) -> CollectionKey {
        self.key(T::COLLECTION.module)
    }
}

impl Default for KeyNamespace {
    fn default() -> Self {
        KeyNamespace {
            app: crate::DEFAULT_APP.to_string(),
            version: 1,
        }
    }
}

/// A versioned storage key such as `khata_orders_v1`.
///
/// Created on first save by the store; this crate never deletes one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    app: String,
    module: String,
    version: u32,
}

impl CollectionKey {
    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_v{}", self.app, self.module, self.version)
    }
}

impl FromStr for CollectionKey {
    type Err = ValidationError;

    /// Parses `<app>_<module>_v<N>`.
    ///
    /// The module segment may itself contain underscores; the app is the
    /// first segment and the version the last.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "collection key".to_string(),
            reason: reason.to_string(),
        };

        let (rest, version) = s
            .rsplit_once("_v")
            .ok_or_else(|| invalid("missing _v<N> suffix"))?;
        let version: u32 = version
            .parse()
            .map_err(|_| invalid("version must be a positive integer"))?;
        if version == 0 {
            return Err(invalid("version must be a positive integer"));
        }

        let (app, module) = rest
            .split_once('_')
            .ok_or_else(|| invalid("expected <app>_<module>"))?;
        validate_key_segment("app", app)?;
        for part in module.split('_') {
            validate_key_segment("module", part)?;
        }

        Ok(CollectionKey {
            app: app.to_string(),
            module: module.to_string(),
            version,
        })
    }
}

fn validate_key_segment(field: &str, segment: &str) -> Result<(), ValidationError> {
    if segment.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if !segment
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only lowercase letters and digits".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a bill or ledger entry was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Card,
    BankTransfer,
    Cheque,
    /// Goods on credit, settled later.
    Credit,
}

impl PaymentMethod {
    /// Every supported method, in display order.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
        PaymentMethod::Credit,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::Credit => "Credit",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
