use serde::{Deserialize, Serialize};

/// A registered user as stored in the `users` collection.
///
/// `password` holds the bcrypt hash, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

impl User {
    pub fn new(username: String, name: String, password_hash: String) -> Self {
        Self {
            username,
            name,
            password: password_hash,
        }
    }
}
