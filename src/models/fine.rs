//! Fine types and fine records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Largest amount a fine type may carry
pub const MAX_FINE_AMOUNT: i64 = 1_000_000;

/// Longest accepted fine name, in characters
pub const MAX_FINE_NAME_LEN: usize = 100;

/// Fine type (e.g. "late return", "damaged cover")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fine {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
}

/// Create fine type request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFine {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
}

/// Fine charged to a person for an order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FineRecord {
    pub id: i32,
    pub person_id: i32,
    pub order_id: i32,
    pub fine_type_id: i32,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
}

/// Create fine record request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFineRecord {
    #[validate(range(min = 1, message = "person_id must be positive"))]
    pub person_id: i32,
    #[validate(range(min = 1, message = "order_id must be positive"))]
    pub order_id: i32,
    #[validate(range(min = 1, message = "fine_type_id must be positive"))]
    pub fine_type_id: i32,
    #[schema(value_type = String, example = "5.00")]
    pub amount: Decimal,
}
