//! Book catalog service

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
    repository::{
        books::{BookSearchField, BOOK_UPDATE},
        partial_update::{apply_update, SqlValue},
        Repository,
    },
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books_get_by_id(id).await
    }

    /// Substring search; an empty result is reported as not found
    pub async fn search(&self, field: BookSearchField, term: &str) -> AppResult<Vec<Book>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::Validation("search term is required".to_string()));
        }

        let books = self.repository.books_search(field, term).await?;
        if books.is_empty() {
            return Err(AppError::NotFound("no books found".to_string()));
        }
        Ok(books)
    }

    pub async fn by_availability(&self, available: bool) -> AppResult<Vec<Book>> {
        self.repository.books_by_availability(available).await
    }

    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let data = data.normalized();
        data.validate()?;
        if data.price < Decimal::ZERO {
            return Err(AppError::Validation("price must be non-negative".to_string()));
        }

        if self
            .repository
            .books_find_duplicate(&data.name, &data.author_name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "a book with this name and author already exists".to_string(),
            ));
        }

        self.repository.books_create(&data).await
    }

    pub async fn update(&self, id: i32, payload: &Map<String, Value>) -> AppResult<Book> {
        apply_update(&self.repository, &BOOK_UPDATE, SqlValue::Int(id), payload).await?;
        self.repository.books_get_by_id(id).await
    }
}

/// Parse an availability flag from a path segment
pub fn parse_availability(raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::Validation(
            "availability must be true or false".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_availability() {
        assert!(parse_availability("true").unwrap());
        assert!(parse_availability("TRUE").unwrap());
        assert!(parse_availability("1").unwrap());
        assert!(!parse_availability("false").unwrap());
        assert!(!parse_availability("0").unwrap());
        assert!(parse_availability("yes").is_err());
        assert!(parse_availability("").is_err());
    }
}
