//! # Storage Error Types
//!
//! Error types for storage, collection and configuration operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error / io::Error / quota check             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── Strict callers: returned as-is                               │
//! │       │                                                                 │
//! │       └── Lenient store: logged with tracing, default returned         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use khata_core::CoreError;
use thiserror::Error;

/// Storage and persistence errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found in its collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A record with this id already exists in the collection.
    #[error("Duplicate {entity}: '{id}' already exists")]
    Duplicate { entity: String, id: String },

    /// Writing the value would exceed the storage quota.
    ///
    /// ## When This Occurs
    /// A backend configured with a byte quota receives a write that would
    /// push its total stored size above the limit. The previous value under
    /// the key is left untouched.
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Stored value under `key` is not a valid collection.
    #[error("Corrupt data under '{key}': {reason}")]
    CorruptData { key: String, reason: String },

    /// JSON encoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Business rule rejected the change.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Duplicate {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a CorruptData error.
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        DbError::CorruptData {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures of the storage medium itself, as opposed to bad
    /// input or business rule violations.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            DbError::QuotaExceeded { .. }
                | DbError::ConnectionFailed(_)
                | DbError::QueryFailed(_)
                | DbError::PoolExhausted
                | DbError::Io(_)
                | DbError::Internal(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed (message kept)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DbError {
    fn from(err: toml::ser::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message() {
        let err = DbError::QuotaExceeded {
            key: "khata_orders_v1".into(),
            needed: 6000,
            limit: 5000,
        };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded writing 'khata_orders_v1': 6000 bytes needed, 5000 allowed"
        );
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_conversions() {
        let json_err = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err: DbError = json_err.into();
        assert!(matches!(err, DbError::Serialization(_)));
        assert!(!err.is_storage_failure());

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));

        let core = CoreError::MalformedId {
            id: "legacy-7".into(),
            prefix: "ORD".into(),
        };
        let err: DbError = core.into();
        assert_eq!(err.to_string(), "Malformed id 'legacy-7': expected ORD-<digits>");
    }
}
