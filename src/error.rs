//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` returned by every HTTP handler.
//! It maps the failure classes of the API onto HTTP responses: malformed input,
//! authentication failures, authorization failures, store failures and token signing
//! failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly. `From` implementations for `validator::ValidationErrors`,
//! `bcrypt::BcryptError`, [`TokenError`] and [`StoreError`] allow the `?` operator to
//! be used throughout the handlers.

use actix_web::{error::BlockingError, error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::TokenError;
use crate::store::StoreError;

/// Represents all errors surfaced by the HTTP layer.
///
/// Authentication and authorization variants carry messages that are safe to show to
/// clients. Store failures carry internal detail that is logged but never rendered.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credentials or token (HTTP 401).
    Unauthorized(String),
    /// Valid identity requesting a resource it does not own (HTTP 403).
    Forbidden(String),
    /// Malformed request body or headers (HTTP 400).
    BadRequest(String),
    /// Requested resource does not exist for this owner (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error, including token signing failures (HTTP 500).
    InternalServerError(String),
    /// The backing document store failed (HTTP 500).
    DatabaseError(String),
    /// Input failed field validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            // Store detail stays in the log.
            AppError::DatabaseError(_) => HttpResponse::InternalServerError().json(json!({
                "error": "Store failure"
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token failures never reveal which check failed.
///
/// Signing failures are the one exception: they are server faults, not client faults,
/// and map to `InternalServerError`.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => {
                log::error!("token signing failed: {}", msg);
                AppError::InternalServerError("Failed creating token".into())
            }
            TokenError::InvalidLifetime => {
                AppError::InternalServerError("Failed creating token".into())
            }
            other => {
                log::debug!("token rejected: {}", other);
                AppError::Unauthorized("Unauthorized".into())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        log::error!("store failure: {}", error);
        AppError::DatabaseError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::Forbidden("Not your resource".into());
        assert_eq!(error.error_response().status(), 403);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::ValidationError("title: length".into());
        assert_eq!(error.error_response().status(), 422);
    }

    #[actix_rt::test]
    async fn test_store_failure_hides_detail() {
        let error = AppError::DatabaseError("connection refused on 10.0.0.7:5432".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Store failure");
    }

    #[test]
    fn test_token_errors_collapse_to_generic_unauthorized() {
        for error in [
            TokenError::Malformed,
            TokenError::AlgorithmMismatch,
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::NotYetValid,
            TokenError::ClaimMismatch,
        ] {
            match AppError::from(error) {
                AppError::Unauthorized(msg) => assert_eq!(msg, "Unauthorized"),
                other => panic!("unexpected mapping: {:?}", other),
            }
        }

        match AppError::from(TokenError::Signing("key unavailable".into())) {
            AppError::InternalServerError(_) => {}
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
