//! Borrow order domain methods on Repository

use serde_json::Value;

use super::{
    constraint_error,
    partial_update::{self as pu, FieldSpec, SqlValue, UpdateTarget},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::order::{CreateOrder, Order, OrderStatus},
};

pub static ORDER_UPDATE: UpdateTarget = UpdateTarget {
    entity: "order",
    table: "orders",
    key_column: "id",
    touch_column: None,
    fields: &[
        FieldSpec::new("person_id", "person_id", pu::positive_int),
        FieldSpec::new("book_id", "book_id", pu::positive_int),
        FieldSpec::new("borrow_date", "borrow_date", pu::required_date),
        FieldSpec::new("return_date", "return_date", pu::nullable_date),
        FieldSpec::new("actual_return_date", "actual_return_date", pu::nullable_date),
        FieldSpec::new("status", "status", order_status),
    ],
};

fn order_status(value: &Value) -> Result<SqlValue, String> {
    let raw = value.as_str().ok_or_else(|| "must be a string".to_string())?;
    let status: OrderStatus = raw.parse()?;
    Ok(SqlValue::Text(Some(status.as_str().to_string())))
}

impl Repository {
    pub async fn orders_list(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn orders_get_by_id(&self, id: i32) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))
    }

    pub async fn orders_create(&self, data: &CreateOrder) -> AppResult<Order> {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (person_id, book_id, borrow_date, return_date, actual_return_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.person_id)
        .bind(data.book_id)
        .bind(data.borrow_date)
        .bind(data.return_date)
        .bind(data.actual_return_date)
        .bind(data.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "order already exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::partial_update::{build_update, UpdateError};
    use serde_json::json;

    #[test]
    fn test_status_update_is_parameterized() {
        let payload = json!({ "status": "Returned" });
        let stmt = build_update(&ORDER_UPDATE, SqlValue::Int(5), payload.as_object().unwrap()).unwrap();

        assert_eq!(stmt.sql(), "UPDATE orders SET status = $1 WHERE id = $2");
        assert_eq!(
            stmt.args(),
            &[SqlValue::Text(Some("Returned".into())), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_unknown_status_is_invalid_field() {
        let payload = json!({ "status": "Lost", "book_id": 2 });
        let err = build_update(&ORDER_UPDATE, SqlValue::Int(5), payload.as_object().unwrap()).unwrap_err();

        assert_eq!(
            err,
            UpdateError::InvalidField {
                field: "status",
                reason: "status must be one of: Borrowed, Returned, Overdue".into()
            }
        );
    }

    #[test]
    fn test_return_date_can_be_cleared() {
        let payload = json!({ "actual_return_date": null });
        let stmt = build_update(&ORDER_UPDATE, SqlValue::Int(1), payload.as_object().unwrap()).unwrap();
        assert_eq!(stmt.args()[0], SqlValue::Date(None));
    }
}
