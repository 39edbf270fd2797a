//!
//! # Access Policy Decision Point
//!
//! Decides whether a bearer token may invoke a specific resource. The decision is a
//! pure function of the `Authorization` header and the requested resource: the header
//! must be `Bearer <token>`, the token must verify, and its subject must equal the
//! `{userId}` segment of the resource path. Anything else is a `Deny`.
//!
//! Resources are either plain request paths (`/users/alice/tasks`) or API-gateway
//! method ARNs (`arn:aws:execute-api:<region>:<account>:<api>/<stage>/<METHOD>/<path>`).
//! Decisions render as the gateway policy document consumed by custom authorizers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::route::RouteTemplate;
use super::token::Claims;
use super::verifier::{ClaimsVerifier, TokenVerifier};
use super::TokenError;

/// Policy language version understood by the gateway.
pub const POLICY_VERSION: &str = "2012-10-17";
/// The only action a decision ever grants or refuses.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
/// Route parameter that names the owning user.
pub const OWNER_PARAM: &str = "userId";
/// Principal reported when no identity could be established.
pub const ANONYMOUS: &str = "anonymous";

/// User-scoped routes guarded by the decision point.
pub const PROTECTED_ROUTES: [&str; 2] = ["/users/{userId}/tasks", "/users/{userId}/tasks/{taskId}"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Why a request was denied. Kept for logging and status mapping, never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The header is missing or is not exactly `Bearer <token>`.
    MalformedHeader,
    /// The token failed verification.
    InvalidToken(TokenError),
    /// The resource does not name an owner.
    MalformedResource,
    /// The token subject does not own the resource.
    OwnerMismatch,
}

impl DenyReason {
    /// Whether the caller proved an identity at all. Used to pick 401 over 403.
    pub fn is_authentication_failure(&self) -> bool {
        !matches!(self, DenyReason::OwnerMismatch | DenyReason::MalformedResource)
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenyReason::MalformedHeader => write!(f, "malformed authorization header"),
            DenyReason::InvalidToken(e) => write!(f, "invalid token: {}", e),
            DenyReason::MalformedResource => write!(f, "resource has no owner segment"),
            DenyReason::OwnerMismatch => write!(f, "subject does not own resource"),
        }
    }
}

/// The outcome of one admission check, scoped to exactly one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub principal_id: String,
    pub effect: Effect,
    pub resource: String,
    /// Verified claims when the decision is `Allow`.
    pub claims: Option<Claims>,
    /// Internal reason when the decision is `Deny`.
    pub reason: Option<DenyReason>,
}

impl Decision {
    fn allow(claims: Claims, resource: &str) -> Self {
        Self {
            principal_id: claims.sub.clone(),
            effect: Effect::Allow,
            resource: resource.to_string(),
            claims: Some(claims),
            reason: None,
        }
    }

    fn deny(principal: &str, resource: &str, reason: DenyReason) -> Self {
        log::debug!("deny {} on {}: {}", principal, resource, reason);
        Self {
            principal_id: principal.to_string(),
            effect: Effect::Deny,
            resource: resource.to_string(),
            claims: None,
            reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// Renders the decision as a gateway policy document.
    pub fn to_policy(&self) -> PolicyResponse {
        PolicyResponse {
            principal_id: self.principal_id.clone(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    effect: self.effect,
                    action: vec![INVOKE_ACTION.to_string()],
                    resource: vec![self.resource.clone()],
                }],
            },
        }
    }
}

/// Custom-authorizer input as delivered by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizerRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "authorizationToken", default)]
    pub authorization_token: String,
    #[serde(rename = "methodArn", default)]
    pub method_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResponse {
    #[serde(rename = "principalId")]
    pub principal_id: String,
    #[serde(rename = "policyDocument")]
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Action")]
    pub action: Vec<String>,
    #[serde(rename = "Resource")]
    pub resource: Vec<String>,
}

/// Extracts the token from an `Authorization` header value.
///
/// Exactly two space-separated parts are required: the `Bearer` scheme (any case) and
/// a non-empty token.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Returns the request path a resource refers to.
///
/// Plain paths are returned as-is. Method ARNs have six `:`-separated fields; the last
/// is `<api>/<stage>/<METHOD>/<path>` and the path is everything after the method.
pub fn resource_path(resource: &str) -> Option<String> {
    if resource.starts_with('/') {
        return Some(resource.to_string());
    }

    let fields: Vec<&str> = resource.splitn(6, ':').collect();
    if fields.len() != 6 || fields[0] != "arn" || fields[2] != "execute-api" {
        return None;
    }

    let mut parts = fields[5].splitn(4, '/');
    let (_api, _stage, _method) = (parts.next()?, parts.next()?, parts.next()?);
    let path = parts.next()?;
    Some(format!("/{}", path))
}

/// Stateless admission checks for user-scoped resources.
#[derive(Debug, Clone)]
pub struct PolicyDecisionPoint<V = TokenVerifier> {
    verifier: V,
    routes: Vec<RouteTemplate>,
}

impl<V: ClaimsVerifier> PolicyDecisionPoint<V> {
    pub fn new(verifier: V) -> Self {
        Self {
            verifier,
            routes: PROTECTED_ROUTES.iter().map(|t| RouteTemplate::parse(t)).collect(),
        }
    }

    /// Decides whether `bearer_header` may invoke `resource`, owned by `owner`.
    ///
    /// The header is parsed before the verifier is consulted, and the verifier before
    /// the owner comparison. The first failure short-circuits to `Deny`.
    pub fn decide(&self, bearer_header: &str, resource: &str, owner: &str) -> Decision {
        let token = match parse_bearer(bearer_header) {
            Some(token) => token,
            None => return Decision::deny(ANONYMOUS, resource, DenyReason::MalformedHeader),
        };

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(e) => return Decision::deny(ANONYMOUS, resource, DenyReason::InvalidToken(e)),
        };

        if owner.is_empty() {
            return Decision::deny(&claims.sub, resource, DenyReason::MalformedResource);
        }
        if claims.sub != owner {
            return Decision::deny(&claims.sub, resource, DenyReason::OwnerMismatch);
        }

        Decision::allow(claims, resource)
    }

    /// Finds the owner of `resource` by matching its path against the protected route
    /// templates.
    pub fn owner_of<'r>(&self, path: &'r str) -> Option<&'r str> {
        self.routes
            .iter()
            .find_map(|route| route.param(path, OWNER_PARAM))
    }

    /// Decides for a resource whose owner must be extracted first.
    ///
    /// The header is still checked before the resource, so a bad header never reaches
    /// the verifier regardless of what was requested.
    pub fn decide_resource(&self, bearer_header: &str, resource: &str) -> Decision {
        if parse_bearer(bearer_header).is_none() {
            return Decision::deny(ANONYMOUS, resource, DenyReason::MalformedHeader);
        }

        let path = resource_path(resource);
        let owner = path.as_deref().and_then(|p| self.owner_of(p)).unwrap_or("");
        self.decide(bearer_header, resource, owner)
    }

    /// Evaluates a gateway custom-authorizer request.
    pub fn authorize(&self, request: &AuthorizerRequest) -> Decision {
        self.decide_resource(&request.authorization_token, &request.method_arn)
    }
}
