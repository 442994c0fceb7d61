//! User model

use serde::{Deserialize, Serialize};

/// User document as stored in the `users` collection.
///
/// Users are provisioned out of band; the server only ever rewrites the
/// session fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub password_hash: String,
    /// Current bearer token
    #[serde(default)]
    pub auth_key: Option<String>,
    /// Unix timestamp (seconds) after which `auth_key` is no longer accepted
    #[serde(default)]
    pub auth_key_expiration: Option<i64>,
}

impl User {
    /// Whether the stored token is still accepted at `now`
    pub fn token_valid_at(&self, now: i64) -> bool {
        self.auth_key.is_some() && self.auth_key_expiration.is_some_and(|exp| exp > now)
    }
}
