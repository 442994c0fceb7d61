//! Users repository

use std::sync::Arc;

use super::decode;
use crate::{
    error::{AppError, AppResult},
    models::User,
    store::{DocumentStore, Filter, USERS},
};

#[derive(Clone)]
pub struct UsersRepository {
    store: Arc<dyn DocumentStore>,
}

impl UsersRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get user by username (login)
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.store
            .find_one(USERS, &Filter::new().eq("username", username))
            .await?
            .map(decode)
            .transpose()
    }

    /// Get the user currently holding `token`, whatever its expiration
    pub async fn find_by_auth_key(&self, token: &str) -> AppResult<Option<User>> {
        self.store
            .find_one(USERS, &Filter::new().eq("auth_key", token))
            .await?
            .map(decode)
            .transpose()
    }

    /// Provision a user (out-of-band administration and tests)
    pub async fn insert(&self, user: &User) -> AppResult<()> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::Internal(format!(
                "Username {} already exists",
                user.username
            )));
        }
        self.store
            .insert(USERS, &user.id, serde_json::to_value(user)?)
            .await
    }

    /// Persist new session fields for a user
    pub async fn set_auth_key(&self, user_id: &str, token: &str, expiration: i64) -> AppResult<User> {
        let mut user: User = self
            .store
            .find_one(USERS, &Filter::new().eq("_id", user_id))
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        user.auth_key = Some(token.to_string());
        user.auth_key_expiration = Some(expiration);

        self.store
            .replace(USERS, user_id, serde_json::to_value(&user)?)
            .await?;
        Ok(user)
    }
}
