//! Signed access token issuance/verification and opaque refresh token
//! generation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use thiserror::Error;

use stockroom_core::TenantId;

use crate::claims::AccessClaims;
use crate::user::UserId;

/// Refresh token entropy in bytes (512 bits before encoding).
const REFRESH_TOKEN_BYTES: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Token issuance settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_minutes: i64,
    pub refresh_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_minutes: 30,
            refresh_days: 7,
        }
    }
}

/// A freshly signed access token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedAccess {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 access tokens; mints opaque refresh values.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_minutes: i64,
    refresh_days: i64,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_minutes: config.access_minutes,
            refresh_days: config.refresh_days,
        }
    }

    /// Sign an access token carrying subject, tenant, and role claims.
    pub fn issue_access(
        &self,
        user_id: UserId,
        email: &str,
        tenant: TenantId,
        roles: &[String],
    ) -> Result<IssuedAccess, TokenError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.access_minutes);
        let claims = AccessClaims {
            sub: user_id,
            email: email.to_string(),
            tenant,
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(format!("encode: {e}")))?;
        Ok(IssuedAccess { token, expires_at })
    }

    /// Verify signature and expiry; tampered or expired tokens are rejected.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    /// Lifetime applied to newly issued refresh tokens.
    pub fn refresh_lifetime(&self) -> Duration {
        Duration::days(self.refresh_days)
    }

    /// Mint an opaque refresh token value: 64 random bytes, base64-encoded.
    ///
    /// Stored server-side and compared by exact value; clients never parse it.
    pub fn new_refresh_value() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}
