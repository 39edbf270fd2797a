use crate::auth::{AuthorizerRequest, PolicyDecisionPoint};
use actix_web::{post, web, HttpResponse, Responder};

/// Custom-authorizer endpoint for an external gateway.
///
/// Always answers `200` with a policy document; the `Effect` inside it is the only
/// authorization signal. Missing fields are treated as empty and therefore denied.
#[post("/authorize")]
pub async fn authorize(
    pdp: web::Data<PolicyDecisionPoint>,
    request: web::Json<AuthorizerRequest>,
) -> impl Responder {
    let decision = pdp.authorize(&request);
    log::info!(
        "authorizer {:?} for {} on {}",
        decision.effect,
        decision.principal_id,
        decision.resource
    );
    HttpResponse::Ok().json(decision.to_policy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Effect, PolicyResponse, TokenService, TokenVerifier};
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_rt::test]
    async fn test_authorize_endpoint_renders_policy() {
        let pdp = PolicyDecisionPoint::new(TokenVerifier::new("authorizer-secret"));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pdp))
                .service(authorize),
        )
        .await;

        let token = TokenService::new("authorizer-secret").issue("alice", 10).unwrap().token;
        let arn = "arn:aws:execute-api:us-east-1:123456789012:api/prod/GET/users/alice/tasks";

        let req = test::TestRequest::post()
            .uri("/authorize")
            .set_json(json!({
                "type": "TOKEN",
                "authorizationToken": format!("Bearer {}", token),
                "methodArn": arn
            }))
            .to_request();
        let policy: PolicyResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(policy.principal_id, "alice");
        assert_eq!(policy.policy_document.statement[0].effect, Effect::Allow);
        assert_eq!(policy.policy_document.statement[0].resource, vec![arn.to_string()]);

        let req = test::TestRequest::post()
            .uri("/authorize")
            .set_json(json!({"methodArn": arn}))
            .to_request();
        let policy: PolicyResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(policy.policy_document.statement[0].effect, Effect::Deny);
    }
}
