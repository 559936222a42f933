//! JWT authentication and password hashing.
//!
//! Login verifies the argon2 hash and issues a JWT whose claims carry
//! the user, branch, role and a session id (`jti`). The `Claims`
//! extractor validates the bearer token on every protected route, and
//! role checks happen server-side against the claim, never in a
//! client.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kasa_core::Role;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Claims
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Branch the user operates in
    pub branch_id: String,

    /// Role claim, checked by `require_role`
    pub role: Role,

    /// Display name (for receipts and logs)
    pub name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID - doubles as the session (and cart) key
    pub jti: String,
}

impl Claims {
    /// Rejects the request unless the role claim satisfies `required`.
    pub fn require_role(&self, required: Role) -> Result<(), ApiError> {
        if self.role.allows(required) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "{:?} role required",
                required
            )))
        }
    }
}

// =============================================================================
// JWT Manager
// =============================================================================

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a token for a logged-in user.
    ///
    /// The generated `jti` becomes the session key owning the cart.
    pub fn generate_token(
        &self,
        user_id: &str,
        branch_id: &str,
        role: Role,
        name: &str,
    ) -> Result<(String, Claims), ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            branch_id: branch_id.to_string(),
            role,
            name: name.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds (for the login response).
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

/// Extract bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored argon2 PHC string.
///
/// Unparseable hashes (e.g. seed placeholders) verify as false, not as
/// an internal error; those accounts simply cannot log in.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// Axum Extractor
// =============================================================================

/// Pulls and validates the bearer token on protected routes.
///
/// Handlers just take `claims: Claims` as an argument; a missing or
/// invalid token never reaches the handler body.
#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected Bearer token"))?;

        state.jwt.validate_token(token)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let (token, issued) = manager
            .generate_token("user-1", "branch-1", Role::Manager, "Müdür")
            .unwrap();

        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.branch_id, "branch-1");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("secret-a".to_string(), 3600);
        let (token, _) = manager
            .generate_token("user-1", "branch-1", Role::Cashier, "Kasiyer")
            .unwrap();

        let other = JwtManager::new("secret-b".to_string(), 3600);
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_require_role() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let (_, claims) = manager
            .generate_token("user-1", "branch-1", Role::Cashier, "Kasiyer")
            .unwrap();

        assert!(claims.require_role(Role::Cashier).is_ok());
        assert!(claims.require_role(Role::Admin).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("gizli-sifre-123").unwrap();

        assert!(verify_password("gizli-sifre-123", &hash));
        assert!(!verify_password("yanlis-sifre", &hash));
        // Seed placeholder never verifies
        assert!(!verify_password("anything", "!seed-no-login"));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
