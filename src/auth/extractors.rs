use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::Claims;
use crate::error::AppError;

/// The verified subject of the current request.
///
/// `AuthMiddleware` inserts the verified [`Claims`] into request extensions after an
/// `Allow` decision. Handlers behind it take this extractor to learn who is calling.
/// If the claims are missing the middleware did not run, and the request is rejected
/// with `401 Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject(pub String);

impl FromRequest for AuthenticatedSubject {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedSubject(claims.sub.clone()))),
            None => {
                let err = AppError::Unauthorized("Unauthorized".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{AUDIENCE, ISSUER, NOT_BEFORE, SCOPE};
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_subject_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims {
            iss: ISSUER.into(),
            aud: AUDIENCE.into(),
            exp: 20,
            jti: "jti".into(),
            iat: 10,
            nbf: NOT_BEFORE,
            sub: "alice".into(),
            scope: SCOPE.into(),
        });

        let mut payload = Payload::None;
        let subject = AuthenticatedSubject::from_request(&req, &mut payload).await;
        assert_eq!(subject.unwrap().0, "alice");
    }

    #[actix_rt::test]
    async fn test_authenticated_subject_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = AuthenticatedSubject::from_request(&req, &mut payload).await;
        let err = result.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
