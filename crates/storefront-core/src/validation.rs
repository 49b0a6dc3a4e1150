//! # Validation Module
//!
//! Input validation for checkout forms, catalog forms and registration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (serde)                                                  │
//! │  └── Type validation (deserialization)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (Rust)                                               │
//! │  └── THIS MODULE: field formats, lengths, ranges                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE (tenant_id, slug)                                           │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{normalize_phone, validate_quantity};
//!
//! assert_eq!(normalize_phone("+880 1712-345678").unwrap(), "01712345678");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::VariantAttributes;
use crate::MAX_ORDER_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Checkout Validators
// =============================================================================

/// Validates the customer's name and returns it trimmed.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("customer name"));
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Normalises a local mobile number and checks its format.
///
/// ## Rules
/// ```text
/// "+880 1712-345678"
///      │ strip spaces, dashes, parentheses
///      ▼
/// "+8801712345678"
///      │ strip country code (+88 / 88)
///      ▼
/// "01712345678"
///      │ must be 01[3-9] followed by 8 digits
///      ▼
/// OK
/// ```
pub fn normalize_phone(phone: &str) -> ValidationResult<String> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    if compact.is_empty() {
        return Err(required("phone"));
    }

    let local = compact
        .strip_prefix("+88")
        .or_else(|| compact.strip_prefix("88"))
        .filter(|rest| rest.starts_with("01"))
        .unwrap_or(&compact);

    let bytes = local.as_bytes();
    let valid = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && local.starts_with("01")
        && (b'3'..=b'9').contains(&bytes[2]);

    if !valid {
        return Err(invalid("phone", "must be a valid mobile number (01XXXXXXXXX)"));
    }

    Ok(local.to_string())
}

/// Validates a delivery address and returns it trimmed.
pub fn validate_address(address: &str, min_len: usize) -> ValidationResult<String> {
    let address = address.trim();

    if address.is_empty() {
        return Err(required("address"));
    }

    if address.chars().count() < min_len {
        return Err(ValidationError::TooShort {
            field: "address".to_string(),
            min: min_len,
        });
    }

    if address.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 500,
        });
    }

    Ok(address.to_string())
}

/// Validates an order quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ORDER_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a URL slug (tenant store slug or product slug).
///
/// ## Rules
/// - 3 to 50 characters
/// - lowercase ASCII letters, digits and hyphens
/// - no leading/trailing hyphen
///
/// ```rust
/// use storefront_core::validation::validate_slug;
///
/// assert!(validate_slug("rina-fashion").is_ok());
/// assert!(validate_slug("Rina Fashion").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    if slug.is_empty() {
        return Err(required("slug"));
    }

    if slug.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "slug".to_string(),
            min: 3,
        });
    }

    if slug.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: 50,
        });
    }

    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        || slug.starts_with('-')
        || slug.ends_with('-')
    {
        return Err(invalid(
            "slug",
            "must contain only lowercase letters, numbers, and inner hyphens",
        ));
    }

    Ok(())
}

/// Validates a display name (product, plan, store, shipping class).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required(field));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a non-negative amount in minor units (zero allowed).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Checks that variant attributes are a JSON object and returns it.
///
/// Keys are not checked against any schema.
pub fn validate_attributes(value: serde_json::Value) -> ValidationResult<VariantAttributes> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(VariantAttributes::new()),
        _ => Err(invalid("attributes", "must be a JSON object")),
    }
}

// =============================================================================
// Account Validators
// =============================================================================

/// Loose email shape check; delivery is the mailer's problem.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(required("email"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(invalid("email", "must be a valid email address"));
    }

    Ok(email.to_lowercase())
}

/// Validates a custom domain hostname and returns it lowercased.
pub fn validate_hostname(hostname: &str) -> ValidationResult<String> {
    let hostname = hostname.trim().trim_end_matches('.').to_lowercase();

    if hostname.is_empty() {
        return Err(required("hostname"));
    }

    if hostname.len() > 253 {
        return Err(ValidationError::TooLong {
            field: "hostname".to_string(),
            max: 253,
        });
    }

    let labels_ok = hostname.split('.').count() >= 2
        && hostname.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        });

    if !labels_ok {
        return Err(invalid("hostname", "must be a valid domain name"));
    }

    Ok(hostname)
}

// =============================================================================
// Unit Tests
// =============================================================================
