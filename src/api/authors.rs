//! Author catalog endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppResult, Envelope},
    models::{Author, AuthorPayload},
    AppState,
};

use super::{required_id, AuthenticatedUser, JsonBody};

/// List active authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active authors", body = Vec<Author>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<Envelope<Vec<Author>>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(Envelope::ok(authors, "Autores encontrados")))
}

/// Get an active author by the `_id` carried in the body
#[utoipa::path(
    get,
    path = "/authors/view",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Missing `_id` or author not found")
    )
)]
pub async fn view_author(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<AuthorPayload>,
) -> AppResult<Json<Envelope<Author>>> {
    let id = required_id(payload.id(), "Se debe mandar el campo '_id'")?;
    let author = state.services.catalog.get_author(&id).await?;
    Ok(Json(Envelope::ok(author, "Autor encontrado")))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 404, description = "Validation failed")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<AuthorPayload>,
) -> AppResult<(StatusCode, Json<Envelope<Author>>)> {
    let author = state.services.catalog.create_author(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(author, "Autor agregado con éxito")),
    ))
}

/// Update an active author
#[utoipa::path(
    put,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Missing `_id`, validation failed or author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<AuthorPayload>,
) -> AppResult<Json<Envelope<Author>>> {
    let id = required_id(payload.id(), "Se requiere el '_id' del autor")?;
    let author = state.services.catalog.update_author(&id, &payload).await?;
    Ok(Json(Envelope::ok(author, "Autor editado con éxito")))
}

/// Soft-delete an author
#[utoipa::path(
    delete,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author deleted"),
        (status = 404, description = "Missing `_id` or author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<AuthorPayload>,
) -> AppResult<Json<Envelope<bool>>> {
    let id = required_id(payload.id(), "Se debe enviar el '_id' del autor")?;
    state.services.catalog.delete_author(&id).await?;
    Ok(Json(Envelope::ok(true, "Autor eliminado correctamente")))
}
