pub mod auth;
pub mod authorizer;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Registers every route. Expects `web::Data<AppState>` and
/// `web::Data<PolicyDecisionPoint>` in app data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(authorizer::authorize)
        .service(
            web::scope("/users/{userId}/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::delete_task),
        );
}

/// CORS policy for browser clients: any origin, the verbs the API serves, and the
/// headers those clients send.
pub fn cors() -> actix_cors::Cors {
    use actix_web::http::header::{self, HeaderName};

    actix_cors::Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["POST", "GET", "OPTIONS", "PUT", "DELETE"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
        ])
        .max_age(3600)
}
