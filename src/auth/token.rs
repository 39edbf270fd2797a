use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer stamped into every token.
pub const ISSUER: &str = "Issuer";
/// Audience stamped into every token.
pub const AUDIENCE: &str = "Audience";
/// Scope granted to every token.
pub const SCOPE: &str = "api:access";
/// Not-before instant (seconds since epoch). Fixed in the past so tokens are usable
/// as soon as they are issued.
pub const NOT_BEFORE: i64 = 2;

/// Represents the claims encoded within a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Who created and signed the token.
    pub iss: String,
    /// Who the token is intended for.
    pub aud: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token identifier.
    pub jti: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Not-before timestamp (seconds since epoch).
    pub nbf: i64,
    /// Subject of the token: the username.
    pub sub: String,
    /// Granted scope. Serialized as `scopes` for compatibility with tokens already in
    /// circulation.
    #[serde(rename = "scopes", alias = "scope")]
    pub scope: String,
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Expiration timestamp (seconds since epoch).
    pub expires_at: i64,
}

/// Reasons a token could not be issued or verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed JWS or its claims have the wrong shape.
    Malformed,
    /// The token header names an algorithm outside the HMAC family.
    AlgorithmMismatch,
    /// The signature matches none of the configured secrets.
    InvalidSignature,
    /// `exp` is in the past.
    Expired,
    /// `nbf` is in the future.
    NotYetValid,
    /// Issuer or audience differ from the expected constants, or a required claim is
    /// missing.
    ClaimMismatch,
    /// The signing operation itself failed.
    Signing(String),
    /// A token was requested with a zero lifetime.
    InvalidLifetime,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::AlgorithmMismatch => write!(f, "unexpected signing algorithm"),
            TokenError::InvalidSignature => write!(f, "invalid signature"),
            TokenError::Expired => write!(f, "token expired"),
            TokenError::NotYetValid => write!(f, "token not yet valid"),
            TokenError::ClaimMismatch => write!(f, "issuer, audience or required claim mismatch"),
            TokenError::Signing(msg) => write!(f, "signing failed: {}", msg),
            TokenError::InvalidLifetime => write!(f, "token lifetime must be positive"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues HMAC-SHA256 signed bearer tokens.
///
/// The secret is injected at construction and never changes for the lifetime of the
/// service. Rotating it means constructing a new service and moving the old secret to
/// the verifier's previous slot (see [`TokenVerifier`](super::TokenVerifier)).
#[derive(Clone)]
pub struct TokenService {
    key: Option<EncodingKey>,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        // An empty secret is treated as an unavailable key.
        let key = (!secret.is_empty()).then(|| EncodingKey::from_secret(secret.as_bytes()));
        Self { key }
    }

    /// Issues a token for `subject` that expires `ttl_minutes` from now.
    ///
    /// # Errors
    /// * `TokenError::InvalidLifetime` if `ttl_minutes` is zero.
    /// * `TokenError::Signing` if the key is unavailable or encoding fails.
    pub fn issue(&self, subject: &str, ttl_minutes: u32) -> Result<IssuedToken, TokenError> {
        if ttl_minutes == 0 {
            return Err(TokenError::InvalidLifetime);
        }
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| TokenError::Signing("signing key unavailable".into()))?;

        let now = chrono::Utc::now().timestamp();
        let expires_at = now + i64::from(ttl_minutes) * 60;

        let claims = Claims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            exp: expires_at,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            nbf: NOT_BEFORE,
            sub: subject.to_string(),
            scope: SCOPE.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
