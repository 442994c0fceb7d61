//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::User,
    AppState,
};

/// Extractor for the user behind a valid bearer token
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user = state.services.auth.validate_bearer(header).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// JSON request body read regardless of method or content type.
///
/// An empty body or a literal `null` yields `T::default()`, so a request that
/// carries no body is treated like one with every field missing.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Cuerpo JSON inválido: {}", e)))?;
        if value.is_null() {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| AppError::BadRequest(format!("Cuerpo JSON inválido: {}", e)))
    }
}

/// Body-carried `_id`, rejecting absent values with `message`
pub(crate) fn required_id(id: Option<String>, message: &str) -> AppResult<String> {
    id.ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Fallback for verbs an unauthenticated route does not serve
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Fallback for verbs a catalog route does not serve; the token is checked first
pub async fn catalog_method_not_allowed(_user: AuthenticatedUser) -> AppError {
    AppError::MethodNotAllowed
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login).fallback(method_not_allowed))
        .route("/auth/password", post(auth::password).fallback(method_not_allowed))
        // Authors
        .route(
            "/authors",
            get(authors::list_authors)
                .post(authors::create_author)
                .put(authors::update_author)
                .patch(authors::update_author)
                .delete(authors::delete_author)
                .fallback(catalog_method_not_allowed),
        )
        .route(
            "/authors/view",
            get(authors::view_author).fallback(catalog_method_not_allowed),
        )
        // Books
        .route(
            "/books",
            get(books::list_books)
                .post(books::create_book)
                .put(books::update_book)
                .patch(books::update_book)
                .delete(books::delete_book)
                .fallback(catalog_method_not_allowed),
        )
        .route(
            "/books/view",
            get(books::view_book).fallback(catalog_method_not_allowed),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
