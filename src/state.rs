use std::sync::Arc;

use crate::auth::{hash_password, PolicyDecisionPoint, TokenService, TokenVerifier};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{DocumentStore, TaskRepository, UserRepository};

/// Shared handler state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub tasks: TaskRepository,
    pub tokens: TokenService,
    pub token_ttl_minutes: u32,
    pub bcrypt_cost: u32,
    /// Hash at `bcrypt_cost` that no password matches. Logins for unknown users are
    /// checked against it so they cost the same as a wrong password.
    pub dummy_hash: String,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Result<Self, AppError> {
        let dummy_hash = hash_password(&uuid::Uuid::new_v4().to_string(), config.bcrypt_cost)?;
        Ok(Self {
            users: UserRepository::new(store.clone()),
            tasks: TaskRepository::new(store),
            tokens: TokenService::new(&config.token_secret),
            token_ttl_minutes: config.token_ttl_minutes,
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash,
        })
    }
}

/// Builds the decision point that guards user-scoped routes.
pub fn decision_point(config: &Config) -> PolicyDecisionPoint {
    PolicyDecisionPoint::new(TokenVerifier::with_rotation(
        &config.token_secret,
        config.token_previous_secret.as_deref(),
    ))
}
