pub mod extractors;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod route;
pub mod token;
pub mod verifier;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedSubject;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use policy::{AuthorizerRequest, Decision, DenyReason, Effect, PolicyDecisionPoint, PolicyResponse};
pub use token::{Claims, IssuedToken, TokenError, TokenService};
pub use verifier::{ClaimsVerifier, TokenVerifier};

lazy_static! {
    // Usernames end up as path segments, so no slashes or whitespace.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Represents the payload for a login request.
///
/// Both fields default to empty so a missing field is reported as a bad request by the
/// handler instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username. Between 3 and 32 characters of letters, digits, `_`, `.` or `-`.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, dots, or hyphens"
        )
    )]
    pub username: String,
    /// Display name.
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: String,
    /// Password. Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Always `Bearer`.
    pub token_type: String,
    pub access_token: String,
    /// Expiry of the token as seconds since epoch.
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            access_token: issued.token,
            expires_in: issued.expires_at,
        }
    }
}
