//! Book endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    models::{Book, BookPayload},
    AppState,
};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Every book in the library", body = Vec<Book>),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "13-digit ISBN")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.find_by_isbn(&isbn).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "13-digit ISBN")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book created", body = Book),
        (status = 403, description = "Payload sets create_time or update_time"),
        (status = 406, description = "Malformed ISBN or missing fields"),
        (status = 409, description = "A book with this ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(payload) = payload?;
    let book = state.services.books.create(&isbn, payload).await?;
    Ok(Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "13-digit ISBN")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Payload changes the ISBN or a server-owned timestamp"),
        (status = 404, description = "Book not found"),
        (status = 406, description = "Malformed ISBN or missing fields"),
        (status = 425, description = "Book was updated less than the cooldown window ago")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(payload) = payload?;
    let book = state.services.books.update(&isbn, payload).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "13-digit ISBN")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found or already deleted")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.services.books.delete(&isbn).await?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")]))
}
