//! Access-token minting and validation.
//!
//! Mockdeck issues short-lived HS256 tokens carrying the user's id, org,
//! and role, so request handling never re-resolves tenancy or role from the
//! database. There is no refresh flow: clients re-authenticate when the
//! token lapses.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mockdeck_core::types::DbId;
use mockdeck_db::models::user::UserWithRole;
use serde::{Deserialize, Serialize};

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// The organization the user belongs to.
    pub org: DbId,
    /// The user's role name (`admin`, `designer`, `reviewer`).
    pub role: String,
    /// Issued-at (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration (UTC Unix timestamp).
    pub exp: i64,
}

/// Default token lifetime in minutes.
const DEFAULT_TOKEN_TTL_MINS: i64 = 60;

/// Signing configuration for access tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    /// Token lifetime in minutes (default: 60).
    pub token_ttl_mins: i64,
}

impl JwtConfig {
    /// Read signing configuration from the environment.
    ///
    /// `JWT_SECRET` is required and must be non-empty;
    /// `JWT_TOKEN_TTL_MINS` defaults to 60.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_ttl_mins = std::env::var("JWT_TOKEN_TTL_MINS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_MINS);

        Self {
            secret,
            token_ttl_mins,
        }
    }
}

/// Mint an access token for an authenticated user.
pub fn mint_token(
    user: &UserWithRole,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        org: user.org_id,
        role: user.role.clone(),
        iat,
        exp: iat + config.token_ttl_mins * 60,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry, returning its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl_mins: i64) -> JwtConfig {
        JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            token_ttl_mins: ttl_mins,
        }
    }

    fn reviewer() -> UserWithRole {
        UserWithRole {
            id: 42,
            org_id: 7,
            email: "r@acme.test".to_string(),
            password_hash: String::new(),
            display_name: "Reviewer".to_string(),
            role: "reviewer".to_string(),
        }
    }

    #[test]
    fn minted_token_carries_user_org_and_role() {
        let config = config(60);
        let token = mint_token(&reviewer(), &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.org, 7);
        assert_eq!(claims.role, "reviewer");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_token(&reviewer(), &config(60)).unwrap();
        let other = JwtConfig {
            secret: "a-different-secret".to_string(),
            token_ttl_mins: 60,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn lapsed_token_is_rejected() {
        let config = config(-5);
        let token = mint_token(&reviewer(), &config).unwrap();
        assert!(validate_token(&token, &config).is_err());
    }
}
