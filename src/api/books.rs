//! Book catalogue endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Document, NewBook},
    AppState,
};

use super::{BulkCreatedResponse, CreatedResponse, JsonBody, MergeFields, MessageResponse};

/// List every book
#[utoipa::path(
    get,
    path = "/libros",
    tag = "libros",
    responses(
        (status = 200, description = "All books", body = Vec<Document>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/libros/{id}",
    tag = "libros",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book", body = Document),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/libros",
    tag = "libros",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = CreatedResponse),
        (status = 400, description = "Missing required field", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let book: NewBook = body.into_record()?;
    let id = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Merge fields into a book (creates it when absent)
#[utoipa::path(
    put,
    path = "/libros/{id}",
    tag = "libros",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = MergeFields,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.update(&id, body.into_fields()?).await?;
    Ok(Json(MessageResponse::new("Libro actualizado")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/libros/{id}",
    tag = "libros",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted (or already absent)")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.books.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create several books; all are validated before any is stored
#[utoipa::path(
    post,
    path = "/libros/bulk",
    tag = "libros",
    request_body = Vec<NewBook>,
    responses(
        (status = 201, description = "Books created", body = BulkCreatedResponse),
        (status = 400, description = "A book is missing a required field", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_create_books(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<BulkCreatedResponse>)> {
    let books: Vec<NewBook> = body.into_records()?;
    let ids = state.services.books.bulk_create(books).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreatedResponse {
            message: "Libros añadidos correctamente".to_string(),
            ids,
        }),
    ))
}
