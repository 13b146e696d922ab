//! HS256 bearer tokens.

use chrono::Duration;
use cinereview_core::clock::SharedClock;
use cinereview_core::error::DomainError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{Role, User};

/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Role at the time of issue.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: SharedClock,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer for `secret`; tokens live for `ttl`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration, clock: SharedClock) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Issues a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Infrastructure(format!("token signing failed: {e}")))
    }

    /// Checks signature and expiry and returns the claims.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` for a malformed, tampered or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::Unauthorized(format!("invalid token: {e}")))
    }
}
