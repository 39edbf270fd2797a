#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A per-user task API behind a bearer-token authorizer: token issuance and"]
#![doc = "verification, the access policy decision point, the document store, and the"]
#![doc = "HTTP routes. The binary (`main.rs`) only wires these together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
