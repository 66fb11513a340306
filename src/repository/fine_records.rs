//! Fine record domain methods on Repository

use super::{
    constraint_error,
    partial_update::{self as pu, FieldSpec, UpdateTarget},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::fine::{CreateFineRecord, FineRecord},
};

/// Upper bound on rows returned by a listing
const LIST_LIMIT: i64 = 1000;

pub static FINE_RECORD_UPDATE: UpdateTarget = UpdateTarget {
    entity: "fine record",
    table: "fine_records",
    key_column: "id",
    touch_column: None,
    fields: &[
        FieldSpec::new("person_id", "person_id", pu::positive_int),
        FieldSpec::new("order_id", "order_id", pu::positive_int),
        FieldSpec::new("fine_type_id", "fine_type_id", pu::positive_int),
        FieldSpec::new("amount", "amount", pu::positive_money),
    ],
};

impl Repository {
    pub async fn fine_records_list(&self) -> AppResult<Vec<FineRecord>> {
        let rows = sqlx::query_as::<_, FineRecord>("SELECT * FROM fine_records ORDER BY id LIMIT $1")
            .bind(LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn fine_records_get_by_id(&self, id: i32) -> AppResult<FineRecord> {
        sqlx::query_as::<_, FineRecord>("SELECT * FROM fine_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("fine record not found".to_string()))
    }

    pub async fn fine_records_create(&self, data: &CreateFineRecord) -> AppResult<FineRecord> {
        sqlx::query_as::<_, FineRecord>(
            r#"
            INSERT INTO fine_records (person_id, order_id, fine_type_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.person_id)
        .bind(data.order_id)
        .bind(data.fine_type_id)
        .bind(data.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "fine record already exists"))
    }
}
