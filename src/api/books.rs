//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook},
    repository::books::BookSearchField,
    services::books::parse_availability,
};

use super::{AuthenticatedUser, JsonBody, PathParam};

/// Add a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Same name and author already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.create(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Search books by name
#[utoipa::path(
    get,
    path = "/books/name/{name}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Part of the title")),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No match", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_by_name(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(name): PathParam<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.search(BookSearchField::Name, &name).await?;
    Ok(Json(books))
}

/// Search books by author
#[utoipa::path(
    get,
    path = "/books/author/{author}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("author" = String, Path, description = "Part of the author name")),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No match", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_by_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(author): PathParam<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.search(BookSearchField::Author, &author).await?;
    Ok(Json(books))
}

/// Search books by type
#[utoipa::path(
    get,
    path = "/books/type/{type}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("type" = String, Path, description = "Part of the book type")),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No match", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_by_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(type_of_book): PathParam<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.search(BookSearchField::Type, &type_of_book).await?;
    Ok(Json(books))
}

/// Books by availability
#[utoipa::path(
    get,
    path = "/books/available/{flag}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("flag" = String, Path, description = "true, false, 1 or 0")),
    responses(
        (status = 200, description = "Books with that availability", body = Vec<Book>),
        (status = 400, description = "Unrecognized flag", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_by_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(flag): PathParam<String>,
) -> AppResult<Json<Vec<Book>>> {
    let available = parse_availability(&flag)?;
    let books = state.services.books.by_availability(available).await?;
    Ok(Json(books))
}

/// Update book fields
///
/// Accepts any subset of `type_of_book`, `name`, `author_name`,
/// `is_available`, `quantity`, `price`.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 400, description = "No valid fields or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update(id, &payload).await?;
    Ok(Json(book))
}
