//! Book model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    /// Genre / category of the book
    pub type_of_book: String,
    pub name: String,
    pub author_name: String,
    pub is_available: bool,
    /// Number of copies held
    pub quantity: i32,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "type_of_book is required"))]
    pub type_of_book: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "author_name is required"))]
    pub author_name: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "quantity must be non-negative"))]
    pub quantity: i32,
    #[serde(default)]
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
}

impl CreateBook {
    pub fn normalized(mut self) -> Self {
        self.type_of_book = self.type_of_book.trim().to_string();
        self.name = self.name.trim().to_string();
        self.author_name = self.author_name.trim().to_string();
        self
    }
}

fn default_available() -> bool {
    true
}
