//! Signed bearer tokens.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. They are valid
//! for exactly [`TOKEN_TTL_SECS`] after issue and can be checked by any holder
//! of the secret without touching the store or the session cache.

use std::fmt;

use authgate_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token validity window: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The user's internal database id.
    pub user_id: DbId,
    pub username: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp), always `iat + TOKEN_TTL_SECS`.
    pub exp: i64,
}

impl Claims {
    /// Claims for a token issued at `now` (Unix seconds).
    pub fn new(user_id: DbId, username: &str, now: i64) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Secret used to sign and verify tokens.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret.
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Issue a token for the given user, valid from now for 24 hours.
pub fn generate_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, username, chrono::Utc::now().timestamp());
    sign(&claims, config)
}

/// Sign an arbitrary claim set.
pub fn sign(claims: &Claims, config: &JwtConfig) -> Result<String, TokenError> {
    if config.secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?)
}

/// Verify a token's signature and expiry and return its [`Claims`].
///
/// No leeway is applied: a token is rejected as soon as `exp` has passed.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    if config.secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
