//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppResult, Envelope},
    models::{Book, BookPayload},
    AppState,
};

use super::{required_id, AuthenticatedUser, JsonBody};

/// List active books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active books", body = Vec<Book>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<Envelope<Vec<Book>>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(Envelope::ok(books, "Libros encontrados")))
}

/// Get an active book by the `_id` carried in the body
#[utoipa::path(
    get,
    path = "/books/view",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Missing `_id` or book not found")
    )
)]
pub async fn view_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Envelope<Book>>> {
    let id = required_id(payload.id(), "Se debe mandar el campo '_id'")?;
    let book = state.services.catalog.get_book(&id).await?;
    Ok(Json(Envelope::ok(book, "Libro encontrado")))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 404, description = "Validation failed")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, Json<Envelope<Book>>)> {
    let book = state.services.catalog.create_book(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(book, "Libro agregado con éxito")),
    ))
}

/// Update an active book
#[utoipa::path(
    put,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Missing `_id`, validation failed or book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Envelope<Book>>> {
    let id = required_id(payload.id(), "Se debe enviar el '_id' del libro")?;
    let book = state.services.catalog.update_book(&id, &payload).await?;
    Ok(Json(Envelope::ok(book, "Libro editado con éxito")))
}

/// Soft-delete a book
#[utoipa::path(
    delete,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Missing `_id` or book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<Json<Envelope<bool>>> {
    let id = required_id(payload.id(), "Se debe enviar el '_id' del libro")?;
    state.services.catalog.delete_book(&id).await?;
    Ok(Json(Envelope::ok(true, "Libro eliminado correctamente")))
}
