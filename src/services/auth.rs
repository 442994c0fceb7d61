//! Authentication service: password checks and bearer-token sessions

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult, AuthError},
    models::User,
    repository::Repository,
};

static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Bearer\s+(\S+)\s*$").expect("valid bearer pattern"));

/// Attempts at drawing a token that no other user holds
const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Source of the current unix time, in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Source of opaque bearer tokens
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// URL-safe base64 over `bytes` bytes from the OS random source
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    bytes: usize,
}

impl RandomTokenGenerator {
    pub fn new(bytes: usize) -> Self {
        Self { bytes: bytes.max(16) }
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

/// A freshly issued session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenGenerator>,
}

impl AuthService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            repository,
            config,
            clock,
            tokens,
        }
    }

    /// Check credentials and start a new session, replacing any previous one
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<IssuedToken> {
        let user = self
            .repository
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(&user, password) {
            tracing::info!("Login rejected for user {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.unique_token().await?;
        let expires_at = self.clock.now() + self.config.token_ttl_seconds;

        self.repository
            .users
            .set_auth_key(&user.id, &token, expires_at)
            .await?;

        tracing::info!("User {} logged in, token valid until {}", user.username, expires_at);

        Ok(IssuedToken { token, expires_at })
    }

    /// Resolve the user behind an `Authorization` header value
    pub async fn validate_bearer(&self, header: Option<&str>) -> AppResult<User> {
        let header = header
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let token = BEARER
            .captures(header)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(AuthError::MalformedToken)?;

        let user = self
            .repository
            .users
            .find_by_auth_key(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.token_valid_at(self.clock.now()) {
            tracing::warn!("Expired token presented for user {}", user.username);
            return Err(AuthError::InvalidToken.into());
        }

        Ok(user)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against the user's stored Argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> bool {
        match PasswordHash::new(&user.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => {
                tracing::warn!("User {} has no valid password hash stored", user.username);
                false
            }
        }
    }

    async fn unique_token(&self) -> AppResult<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = self.tokens.generate();
            if self.repository.users.find_by_auth_key(&token).await?.is_none() {
                return Ok(token);
            }
            tracing::warn!("Generated token collides with an existing session, drawing again");
        }
        Err(AppError::Internal(
            "Failed to generate a unique session token".to_string(),
        ))
    }
}
