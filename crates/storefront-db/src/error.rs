//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (rule checked in a tx)   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──────────── DbError::Domain                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (storefront-api) ← status code + JSON body                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Some rules (product limit, bulk ownership, status transitions) have to be
//! checked inside the same transaction as the write. Those repositories
//! return the domain error wrapped in [`DbError::Domain`].

use storefront_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate store slug
    /// - Duplicate product slug within a tenant
    /// - Duplicate custom domain hostname or owner email
    #[error("{field} already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule evaluated inside a transaction failed.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be decoded (bad JSON column, etc.).
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
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
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// Names the user-facing field behind a SQLite unique-constraint message.
///
/// SQLite reports `UNIQUE constraint failed: products.tenant_id, products.slug`;
/// the last column is the one the caller chose, the tenant column never is.
fn unique_field(message: &str) -> String {
    let column = message
        .rsplit(&[',', ' ', '.'][..])
        .find(|part| !part.is_empty())
        .unwrap_or("value");

    match column {
        "owner_email" | "email" => "email",
        other => other,
    }
    .to_string()
}

/// ## Error Mapping
/// ```text
/// RowNotFound                    → NotFound
/// Database, kind UniqueViolation → UniqueViolation { field }  (slug, email, hostname, code)
/// Database, kind ForeignKey...   → ForeignKeyViolation
/// Database, anything else        → QueryFailed
/// PoolTimedOut / PoolClosed      → PoolExhausted / ConnectionFailed
/// ColumnDecode / Decode          → InvalidData
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DbError::UniqueViolation {
                    field: unique_field(db_err.message()),
                },
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => DbError::InvalidData(err.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_is_transparent() {
        let err: DbError = CoreError::ProductLimitReached { limit: 5 }.into();
        assert_eq!(err.to_string(), "product limit reached (5)");
    }

    #[test]
    fn test_validation_error_wraps_into_domain() {
        let err: DbError = ValidationError::Duplicate {
            field: "slug".into(),
            value: "rina".into(),
        }
        .into();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[test]
    fn test_unique_field_names_the_user_column() {
        assert_eq!(unique_field("UNIQUE constraint failed: tenants.slug"), "slug");
        assert_eq!(
            unique_field("UNIQUE constraint failed: products.tenant_id, products.slug"),
            "slug"
        );
        assert_eq!(unique_field("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(unique_field("UNIQUE constraint failed: custom_domains.hostname"), "hostname");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
