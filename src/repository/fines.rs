//! Fine type domain methods on Repository

use rust_decimal::Decimal;
use serde_json::Value;

use super::{
    constraint_error,
    partial_update::{self as pu, FieldSpec, SqlValue, UpdateTarget},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::fine::{CreateFine, Fine, MAX_FINE_AMOUNT, MAX_FINE_NAME_LEN},
};

pub static FINE_UPDATE: UpdateTarget = UpdateTarget {
    entity: "fine",
    table: "fines",
    key_column: "id",
    touch_column: None,
    fields: &[
        FieldSpec::new("name", "name", fine_name),
        FieldSpec::new("amount", "amount", fine_amount),
    ],
};

fn fine_name(value: &Value) -> Result<SqlValue, String> {
    let name = pu::required_text(value)?;
    match &name {
        SqlValue::Text(Some(text)) if text.chars().count() > MAX_FINE_NAME_LEN => {
            Err(format!("must be at most {} characters", MAX_FINE_NAME_LEN))
        }
        _ => Ok(name),
    }
}

fn fine_amount(value: &Value) -> Result<SqlValue, String> {
    let amount = pu::non_negative_money(value)?;
    match &amount {
        SqlValue::Money(a) if *a > Decimal::from(MAX_FINE_AMOUNT) => {
            Err(format!("must not exceed {}", MAX_FINE_AMOUNT))
        }
        _ => Ok(amount),
    }
}

/// Check a fine amount against the accepted range
pub fn check_fine_amount(amount: Decimal) -> AppResult<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::Validation("amount must be non-negative".to_string()));
    }
    if amount > Decimal::from(MAX_FINE_AMOUNT) {
        return Err(AppError::Validation(format!(
            "amount is too large (max {})",
            MAX_FINE_AMOUNT
        )));
    }
    Ok(())
}

impl Repository {
    /// List all fine types
    pub async fn fines_list(&self) -> AppResult<Vec<Fine>> {
        let rows = sqlx::query_as::<_, Fine>("SELECT * FROM fines ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get fine type by ID
    pub async fn fines_get_by_id(&self, id: i32) -> AppResult<Fine> {
        sqlx::query_as::<_, Fine>("SELECT * FROM fines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("fine not found".to_string()))
    }

    /// Id of the fine type with this name, if any
    pub async fn fines_find_by_name(&self, name: &str) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>("SELECT id FROM fines WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// Create a fine type
    pub async fn fines_create(&self, data: &CreateFine) -> AppResult<Fine> {
        sqlx::query_as::<_, Fine>("INSERT INTO fines (name, amount) VALUES ($1, $2) RETURNING *")
            .bind(&data.name)
            .bind(data.amount)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "a fine with this name already exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fine_name_length() {
        assert!(fine_name(&json!("Late return")).is_ok());
        assert!(fine_name(&json!("x".repeat(100))).is_ok());
        assert!(fine_name(&json!("x".repeat(101))).is_err());
        assert!(fine_name(&json!("  ")).is_err());
    }

    #[test]
    fn test_fine_amount_bounds() {
        assert!(fine_amount(&json!(0)).is_ok());
        assert!(fine_amount(&json!(1_000_000)).is_ok());
        assert!(fine_amount(&json!(1_000_000.01)).is_err());
        assert!(fine_amount(&json!(-1)).is_err());

        assert!(check_fine_amount(Decimal::new(500, 2)).is_ok());
        assert!(check_fine_amount(Decimal::from(1_000_001)).is_err());
        assert!(check_fine_amount(Decimal::new(-1, 0)).is_err());
    }
}
