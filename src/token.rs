//! Bearer token signing and verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::UserRole;

/// Claims carried by a session token.
///
/// The shape is fixed: anything that does not deserialize into exactly this
/// structure fails verification rather than yielding a partial claim set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// User role at issuance time
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Session token lifetime: 30 days.
pub const TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

/// Signs and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: u64,
}

/// Result of issuing a session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
}

impl TokenCodec {
    /// Create a codec with the given secret and the default 30-day lifetime.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_lifetime(secret, TOKEN_LIFETIME_SECS)
    }

    /// Create a codec with an explicit token lifetime in seconds.
    pub fn with_lifetime(secret: &[u8], lifetime_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime_secs,
        }
    }

    /// Sign a new token for a subject. Expiry is fixed relative to issuance;
    /// it is never renegotiated per request.
    pub fn issue(&self, subject_id: &str, role: UserRole) -> Result<IssuedToken, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::TimeError)?
            .as_secs();

        let exp = now + self.lifetime_secs;

        let claims = Claims {
            sub: subject_id.to_string(),
            role,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Malformed input, a signature mismatch, or an elapsed expiry all yield
    /// an error; there is no partial success.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(TokenError::Decoding)?;

        Ok(token_data.claims)
    }
}

/// Errors that can occur during token operations.
#[derive(Debug)]
pub enum TokenError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            TokenError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for TokenError {}
