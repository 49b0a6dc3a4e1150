//! JWT authentication module.
//!
//! Tokens are issued by the external auth service and signed with the
//! shared HS256 secret. This module validates them and turns them into
//! request extractors.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! JwtManager::validate_token ──► Claims { tenant_id, role }
//!        │
//!        ├── AuthTenant: load tenant + plan + settings  (owner routes)
//!        └── AdminAuth:  role == "admin"                (admin routes)
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::new_id;

use crate::error::{ServiceError, ServiceResult};
use crate::services::TenantContext;
use crate::AppState;

/// Role claim for store owners.
pub const ROLE_OWNER: &str = "owner";

/// Role claim for platform administrators.
pub const ROLE_ADMIN: &str = "admin";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Tenant ID (absent for platform admins)
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// "owner" or "admin"
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Generate a token. Used by tooling and tests; production tokens come
    /// from the auth service.
    pub fn generate_token(&self, sub: &str, tenant_id: Option<&str>, role: &str) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: sub.to_string(),
            tenant_id: tenant_id.map(str::to_string),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: new_id(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::AuthFailed(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

fn claims_from_parts(parts: &Parts, state: &AppState) -> ServiceResult<Claims> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::AuthFailed("Missing authorization header".to_string()))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ServiceError::AuthFailed("Invalid authorization header".to_string()))?;

    state.jwt.validate_token(token)
}

// =============================================================================
// Extractors
// =============================================================================

/// The authenticated store owner's tenant, with its plan and settings.
pub struct AuthTenant(pub TenantContext);

impl FromRequestParts<Arc<AppState>> for AuthTenant {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        let tenant_id = claims
            .tenant_id
            .ok_or_else(|| ServiceError::AuthFailed("Token carries no tenant".to_string()))?;

        let context = TenantContext::load(&state.db, &tenant_id)
            .await?
            .ok_or_else(|| ServiceError::AuthFailed("Unknown tenant".to_string()))?;

        Ok(AuthTenant(context))
    }
}

/// A platform administrator.
pub struct AdminAuth(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        if !claims.is_admin() {
            return Err(ServiceError::AdminOnly);
        }
        Ok(AdminAuth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.generate_token("user-001", Some("tenant-001"), ROLE_OWNER).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.tenant_id.as_deref(), Some("tenant-001"));
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let token = issuer.generate_token("admin", None, ROLE_ADMIN).unwrap();
        assert!(matches!(verifier.validate_token(&token), Err(ServiceError::AuthFailed(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = JwtManager::new("test-secret", -3600);
        let token = manager.generate_token("user-001", Some("tenant-001"), ROLE_OWNER).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
