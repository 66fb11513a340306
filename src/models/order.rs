//! Borrow order model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Borrow order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[default]
    Borrowed,
    Returned,
    Overdue,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Borrowed, OrderStatus::Returned, OrderStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Borrowed => "Borrowed",
            OrderStatus::Returned => "Returned",
            OrderStatus::Overdue => "Overdue",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| "status must be one of: Borrowed, Returned, Overdue".to_string())
    }
}

// SQLx conversion for OrderStatus
impl sqlx::Type<Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for OrderStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Borrow order from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub person_id: i32,
    pub book_id: i32,
    pub borrow_date: NaiveDate,
    /// Date the book is due back
    pub return_date: Option<NaiveDate>,
    /// Date the book actually came back
    pub actual_return_date: Option<NaiveDate>,
    pub status: OrderStatus,
}

/// Create order request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(range(min = 1, message = "person_id must be positive"))]
    pub person_id: i32,
    #[validate(range(min = 1, message = "book_id must be positive"))]
    pub book_id: i32,
    pub borrow_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub actual_return_date: Option<NaiveDate>,
    /// Defaults to `Borrowed`
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("Returned".parse::<OrderStatus>(), Ok(OrderStatus::Returned));
        assert_eq!(" Overdue ".parse::<OrderStatus>(), Ok(OrderStatus::Overdue));
        assert!("Lost".parse::<OrderStatus>().is_err());
        assert!("returned".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_decodes_from_any_text_column() {
        use sqlx::postgres::PgTypeInfo;
        use sqlx::Type;

        for name in ["TEXT", "VARCHAR", "BPCHAR"] {
            let ty = PgTypeInfo::with_name(name);
            assert_eq!(
                <OrderStatus as Type<Postgres>>::compatible(&ty),
                <String as Type<Postgres>>::compatible(&ty),
                "{}",
                name
            );
        }
        assert!(<OrderStatus as Type<Postgres>>::compatible(&<String as Type<Postgres>>::type_info()));
        assert!(!<OrderStatus as Type<Postgres>>::compatible(&<i32 as Type<Postgres>>::type_info()));
    }

    #[test]
    fn test_create_order_defaults() {
        let order: CreateOrder = serde_json::from_value(serde_json::json!({
            "person_id": 1,
            "book_id": 2,
            "borrow_date": "2024-03-01"
        }))
        .unwrap();
        assert_eq!(order.status.unwrap_or_default(), OrderStatus::Borrowed);
        assert!(order.return_date.is_none());
    }
}
