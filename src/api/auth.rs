//! Authentication endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, AuthError, Envelope},
    AppState,
};

use super::JsonBody;

/// Login request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Password hashing request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<Envelope<String>>> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let issued = state.services.auth.authenticate(&username, &password).await?;

    Ok(Json(Envelope::ok(issued.token, "Token generado correctamente")))
}

/// Hash a password for provisioning a user
#[utoipa::path(
    post,
    path = "/auth/password",
    tag = "auth",
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password hash"),
        (status = 400, description = "Missing password")
    )
)]
pub async fn password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PasswordRequest>,
) -> AppResult<Json<Envelope<String>>> {
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Se debe enviar el campo 'password'".to_string()))?;

    let hash = state.services.auth.hash_password(&password)?;

    Ok(Json(Envelope::ok(hash, "Contraseña generada correctamente")))
}
