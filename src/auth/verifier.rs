use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use std::fmt;

use super::token::{Claims, TokenError, AUDIENCE, ISSUER};

/// Algorithms accepted by the verifier. Pinned here, never read from the token.
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Anything that can turn a raw token into verified claims.
///
/// [`TokenVerifier`] is the production implementation; the decision point is generic
/// over this trait so admission logic can be exercised in isolation.
pub trait ClaimsVerifier {
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// Verifies tokens issued by [`TokenService`](super::TokenService).
///
/// Holds the current secret and, during a rotation window, the previous one. A token
/// whose signature fails under the current secret is retried under the previous
/// secret; every other failure is final.
#[derive(Clone)]
pub struct TokenVerifier {
    current: DecodingKey,
    previous: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self::with_rotation(secret, None)
    }

    /// Builds a verifier that also accepts tokens signed with `previous`.
    pub fn with_rotation(secret: &str, previous: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_FAMILY.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);

        Self {
            current: DecodingKey::from_secret(secret.as_bytes()),
            previous: previous
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    fn verify_with(&self, key: &DecodingKey, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }
}

impl ClaimsVerifier for TokenVerifier {
    /// Verifies the signature, algorithm, time window, issuer and audience of `token`.
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if let Some(alg) = header_algorithm(token) {
            let pinned = alg
                .parse::<Algorithm>()
                .map(|a| HMAC_FAMILY.contains(&a))
                .unwrap_or(false);
            if !pinned {
                return Err(TokenError::AlgorithmMismatch);
            }
        }

        match self.verify_with(&self.current, token) {
            Err(TokenError::InvalidSignature) => match &self.previous {
                Some(previous) => self.verify_with(previous, token),
                None => Err(TokenError::InvalidSignature),
            },
            result => result,
        }
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("rotating", &self.previous.is_some())
            .finish_non_exhaustive()
    }
}

/// Reads the `alg` name from the token header without trusting anything else in it.
///
/// Returns `None` when the header is not base64url JSON with a string `alg`; such
/// tokens are left to `decode`, which reports them as malformed. Names jsonwebtoken
/// cannot represent, such as `none`, still come back here.
fn header_algorithm(token: &str) -> Option<String> {
    let header = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(header).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("alg")?.as_str().map(str::to_string)
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => TokenError::AlgorithmMismatch,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => TokenError::ClaimMismatch,
        _ => TokenError::Malformed,
    }
}
