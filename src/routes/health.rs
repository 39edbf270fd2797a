use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe for load balancers and the gateway.
///
/// Sits outside the `/users/{userId}` scope, so it needs no bearer token and never
/// touches the store. Answers with the crate name and version so a rollout can be
/// checked from outside.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes;
    use actix_web::{test, App};

    #[actix_rt::test]
    async fn test_health_needs_no_token_or_state() {
        // Full route table, no AppState or decision point registered.
        let app = test::init_service(App::new().configure(routes::config)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "taskgate");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_string());
    }

    #[actix_rt::test]
    async fn test_health_ignores_bad_authorization() {
        let app = test::init_service(App::new().configure(routes::config)).await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
}
