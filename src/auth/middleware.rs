use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::policy::OWNER_PARAM;
use crate::auth::PolicyDecisionPoint;
use crate::error::AppError;

/// Runs the access policy decision point in front of user-scoped routes.
///
/// Must wrap a scope whose pattern binds `{userId}`. Requires a
/// `web::Data<PolicyDecisionPoint>` in app data. On `Allow` the verified
/// claims are inserted into request extensions and the request continues. On `Deny`
/// the inner service is never called: authentication failures answer `401`, owner
/// mismatches answer `403`, both with a generic body.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = match req.app_data::<web::Data<PolicyDecisionPoint>>() {
            Some(pdp) => {
                let auth_header = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("");
                // The router has already matched and percent-decoded `{userId}`,
                // the same value the handlers receive.
                let owner = req.match_info().get(OWNER_PARAM).unwrap_or("");
                pdp.decide(auth_header, req.path(), owner)
            }
            None => {
                log::error!("no decision point configured; refusing {}", req.path());
                let err = AppError::InternalServerError("Authorizer unavailable".into());
                let res = req.into_response(err.error_response()).map_into_right_body();
                return Box::pin(async move { Ok(res) });
            }
        };

        match (decision.claims, decision.reason) {
            (Some(claims), None) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            (_, reason) => {
                let err = match reason {
                    Some(reason) if !reason.is_authentication_failure() => {
                        log::warn!("{} {} forbidden: {}", req.method(), req.path(), reason);
                        AppError::Forbidden("Forbidden".into())
                    }
                    reason => {
                        log::warn!(
                            "{} {} unauthorized: {}",
                            req.method(),
                            req.path(),
                            reason.map(|r| r.to_string()).unwrap_or_default()
                        );
                        AppError::Unauthorized("Unauthorized".into())
                    }
                };
                let res = req.into_response(err.error_response()).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
