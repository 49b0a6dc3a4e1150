//! # Service Error Type
//!
//! Unified error type for services and HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  Handler ──► Service ──► Result<T, ServiceError>                        │
//! │                              │                                          │
//! │    CoreError ────────────────┤  kind() picks status + code              │
//! │    DbError::Domain ──────────┤  unwrapped to CoreError                  │
//! │    DbError::UniqueViolation ─┤  400 INVALID_INPUT                       │
//! │    DbError (anything else) ──┤  500, detail logged, generic message     │
//! │                              ▼                                          │
//! │  HTTP response   404 { "code": "NOT_FOUND", "message": "..." }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Kind              | Status | Code                 |
//! |-------------------|--------|----------------------|
//! | NotFound          | 404    | `NOT_FOUND`          |
//! | InvalidInput      | 400    | `INVALID_INPUT`      |
//! | LimitExceeded     | 403    | `LIMIT_EXCEEDED`     |
//! | Forbidden         | 403    | `FORBIDDEN`          |
//! | InvalidTransition | 409    | `INVALID_TRANSITION` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::{CoreError, ErrorKind, ValidationError};
use storefront_db::DbError;

/// Service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A business rule outcome.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{field} already exists")]
    Duplicate { field: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Admin access required")]
    AdminOnly,

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ServiceError::Core(core),
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::UniqueViolation { field, .. } => ServiceError::Duplicate { field },
            other => ServiceError::Database(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found, or owned by another tenant (404)
    NotFound,

    /// Input validation failed (400)
    InvalidInput,

    /// Plan ceiling reached (403)
    LimitExceeded,

    /// Plan flag or role disallows the action (403)
    Forbidden,

    /// Order status change not allowed (409)
    InvalidTransition,

    /// Missing or invalid bearer token (401)
    Unauthenticated,

    /// Internal server error (500)
    Internal,
}

/// JSON body returned for every failed request.
///
/// ```json
/// { "code": "LIMIT_EXCEEDED", "message": "product limit reached (5)" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    /// The status code and machine-readable code for this error.
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            ServiceError::Core(core) => match core.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
                ErrorKind::LimitExceeded => (StatusCode::FORBIDDEN, ErrorCode::LimitExceeded),
                ErrorKind::Forbidden => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
                ErrorKind::InvalidTransition => (StatusCode::CONFLICT, ErrorCode::InvalidTransition),
            },
            ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            ServiceError::Duplicate { .. } => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            ServiceError::AuthFailed(_) => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated),
            ServiceError::AdminOnly => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
            }
        }
    }

    /// Builds the response body. Server-side failures get a generic message.
    pub fn body(&self) -> ErrorBody {
        let (_, code) = self.classify();
        let message = match self {
            ServiceError::Database(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Database operation failed");
                "Database operation failed".to_string()
            }
            ServiceError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody { code, message }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, _) = self.classify();
        (status, Json(self.body())).into_response()
    }
}
