//! Book domain methods on Repository

use super::{
    constraint_error,
    partial_update::{self as pu, FieldSpec, UpdateTarget},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
};

/// Columns of `books` a client may change
pub static BOOK_UPDATE: UpdateTarget = UpdateTarget {
    entity: "book",
    table: "books",
    key_column: "id",
    touch_column: None,
    fields: &[
        FieldSpec::new("type_of_book", "type_of_book", pu::required_text),
        FieldSpec::new("name", "name", pu::required_text),
        FieldSpec::new("author_name", "author_name", pu::required_text),
        FieldSpec::new("is_available", "is_available", pu::boolean),
        FieldSpec::new("quantity", "quantity", pu::non_negative_int),
        FieldSpec::new("price", "price", pu::non_negative_money),
    ],
};

/// Searchable text columns
#[derive(Debug, Clone, Copy)]
pub enum BookSearchField {
    Name,
    Author,
    Type,
}

impl BookSearchField {
    fn column(self) -> &'static str {
        match self {
            BookSearchField::Name => "name",
            BookSearchField::Author => "author_name",
            BookSearchField::Type => "type_of_book",
        }
    }
}

impl Repository {
    /// List all books
    pub async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))
    }

    /// Id of the book with this exact name and author, if any
    pub async fn books_find_duplicate(&self, name: &str, author_name: &str) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM books WHERE name = $1 AND author_name = $2",
        )
        .bind(name)
        .bind(author_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Case-insensitive substring search on one column
    pub async fn books_search(&self, field: BookSearchField, term: &str) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT * FROM books WHERE {} ILIKE '%' || $1 || '%' ORDER BY id",
            field.column()
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(escape_like(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books filtered by availability
    pub async fn books_by_availability(&self, available: bool) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE is_available = $1 ORDER BY id")
            .bind(available)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create a book
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (type_of_book, name, author_name, is_available, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.type_of_book)
        .bind(&data.name)
        .bind(&data.author_name)
        .bind(data.is_available)
        .bind(data.quantity)
        .bind(data.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "a book with this name and author already exists"))
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
