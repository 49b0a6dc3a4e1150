//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule outcomes                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  storefront-api errors                                                  │
//! │  └── ServiceError     - What HTTP clients see (status + JSON body)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → HTTP response       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//! Every `CoreError` is an expected, user-facing outcome. `CoreError::kind`
//! groups them for transport mapping:
//!
//! | Kind               | Meaning                                              |
//! |--------------------|------------------------------------------------------|
//! | `NotFound`         | absent, or owned by another tenant, or not visible   |
//! | `InvalidInput`     | malformed fields, bad shipping selection             |
//! | `LimitExceeded`    | plan ceiling reached                                 |
//! | `Forbidden`        | plan flag disallows the action                       |
//! | `InvalidTransition`| order status change not in the transition table     |

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Transport-independent classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    LimitExceeded,
    Forbidden,
    InvalidTransition,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity cannot be found.
    ///
    /// ## When This Occurs
    /// - The id does not exist
    /// - The entity belongs to another tenant
    /// - The storefront is suspended/pending, or the product is not active
    ///
    /// The message is the same in every case so callers cannot probe for
    /// other tenants' data.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Shipping class is missing or belongs to another tenant.
    ///
    /// Reported as bad input rather than NotFound: the product was valid,
    /// only the shipping selection was not.
    #[error("invalid shipping option")]
    InvalidShippingOption,

    /// Tenant's plan does not allow another product.
    ///
    /// ## User Workflow
    /// ```text
    /// Create product (6th)
    ///      │
    ///      ▼
    /// Plan check: 5 owned, limit 5
    ///      │
    ///      ▼
    /// ProductLimitReached { limit: 5 }
    ///      │
    ///      ▼
    /// UI shows: "product limit reached (5)" + upgrade prompt
    /// ```
    #[error("product limit reached ({limit})")]
    ProductLimitReached { limit: i64 },

    /// Plan flag disallows the feature.
    #[error("{feature} is not available on the {plan} plan")]
    FeatureNotAllowed { feature: PlanFeature, plan: String },

    /// Order status change is not in the transition table.
    #[error("cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the error's kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InvalidShippingOption | CoreError::Validation(_) => ErrorKind::InvalidInput,
            CoreError::ProductLimitReached { .. } => ErrorKind::LimitExceeded,
            CoreError::FeatureNotAllowed { .. } => ErrorKind::Forbidden,
            CoreError::InvalidStatusTransition { .. } => ErrorKind::InvalidTransition,
        }
    }
}

/// Plan-gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFeature {
    CustomDomain,
    Tracking,
}

impl std::fmt::Display for PlanFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanFeature::CustomDomain => write!(f, "custom domain"),
            PlanFeature::Tracking => write!(f, "tracking"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number, slug, decimal amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., product slug already used by this tenant).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_message_names_the_limit() {
        let err = CoreError::ProductLimitReached { limit: 5 };
        assert_eq!(err.to_string(), "product limit reached (5)");
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_shipping_option_is_invalid_input() {
        let err = CoreError::InvalidShippingOption;
        assert_eq!(err.to_string(), "invalid shipping option");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_not_found_message() {
        let err = CoreError::not_found("Order", "abc");
        assert_eq!(err.to_string(), "Order not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_feature_not_allowed() {
        let err = CoreError::FeatureNotAllowed {
            feature: PlanFeature::CustomDomain,
            plan: "Free".to_string(),
        };
        assert_eq!(err.to_string(), "custom domain is not available on the Free plan");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_transition_error() {
        let err = CoreError::InvalidStatusTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::New,
        };
        assert_eq!(err.to_string(), "cannot change order status from delivered to new");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "address".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidInput);
        assert_eq!(core_err.to_string(), "address is required");
    }
}
