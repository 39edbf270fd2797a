use crate::{
    auth::{hash_password, verify_password, LoginRequest, RegisterRequest, TokenResponse},
    error::AppError,
    models::User,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Stores the user with a bcrypt hash of the password and answers `201` with the
/// username. Usernames are unique; a second registration is a `400`.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        username,
        name,
        password,
    } = register_data.into_inner();

    let cost = state.bcrypt_cost;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    let user = User::new(username, name, password_hash);
    if !state.users.create(&user).await? {
        return Err(AppError::BadRequest("Username already registered".into()));
    }

    log::info!("registered user {}", user.username);
    Ok(HttpResponse::Created().json(user.username))
}

/// Login user
///
/// Checks the password against the stored hash and issues a bearer token bound to the
/// username. Unknown users and wrong passwords get the same `401`.
#[post("/auth")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    if !login_data.is_complete() {
        return Err(AppError::BadRequest(
            "Missing Username and/or Password".into(),
        ));
    }
    let LoginRequest { username, password } = login_data.into_inner();

    let user = match state.users.get_by_username(&username).await? {
        Some(user) => user,
        None => {
            let dummy_hash = state.dummy_hash.clone();
            web::block(move || verify_password(&password, &dummy_hash)).await??;
            log::warn!("login failed for unknown user {}", username);
            return Err(AppError::Unauthorized("Invalid username or password".into()));
        }
    };

    let stored_hash = user.password.clone();
    if !web::block(move || verify_password(&password, &stored_hash)).await?? {
        log::warn!("login failed for user {}", username);
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let issued = state.tokens.issue(&user.username, state.token_ttl_minutes)?;
    log::info!("issued token for user {}", user.username);
    Ok(HttpResponse::Ok().json(TokenResponse::from(issued)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::MIN_COST;
    use crate::auth::{hash_password, TokenService};
    use crate::store::{MemoryStore, TaskRepository, UserRepository};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    fn state_with_dummy(dummy_hash: String) -> AppState {
        let store = Arc::new(MemoryStore::new());
        AppState {
            users: UserRepository::new(store.clone()),
            tasks: TaskRepository::new(store),
            tokens: TokenService::new("route-test-secret"),
            token_ttl_minutes: 10,
            bcrypt_cost: MIN_COST,
            dummy_hash,
        }
    }

    fn state() -> AppState {
        state_with_dummy(hash_password("never-a-password", MIN_COST).unwrap())
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({"username": "a/b", "password": "password123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({"username": "alice", "password": "short"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({"username": "alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_login_requires_both_fields() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(login),
        )
        .await;

        for payload in [json!({"username": "alice"}), json!({"password": "x"}), json!({})] {
            let req = test::TestRequest::post()
                .uri("/auth")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        }
    }

    #[actix_rt::test]
    async fn test_unknown_user_is_checked_against_dummy_hash() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(login),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth")
            .set_json(json!({"username": "ghost", "password": "whatever"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // An unusable dummy hash surfaces as a server error, so the unknown-user
        // branch must have handed it to bcrypt.
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_dummy("not-a-bcrypt-hash".into())))
                .service(login),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth")
            .set_json(json!({"username": "ghost", "password": "whatever"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
