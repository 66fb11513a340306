//! Fine types and fine records

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::fine::{CreateFine, CreateFineRecord, Fine, FineRecord},
    repository::{
        fine_records::FINE_RECORD_UPDATE,
        fines::{check_fine_amount, FINE_UPDATE},
        partial_update::{apply_update, SqlValue},
        Repository,
    },
};

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Fine>> {
        self.repository.fines_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Fine> {
        self.repository.fines_get_by_id(id).await
    }

    pub async fn create(&self, mut data: CreateFine) -> AppResult<Fine> {
        data.name = data.name.trim().to_string();
        data.validate()?;
        check_fine_amount(data.amount)?;

        if self.repository.fines_find_by_name(&data.name).await?.is_some() {
            return Err(AppError::Conflict("a fine with this name already exists".to_string()));
        }

        self.repository.fines_create(&data).await
    }

    pub async fn update(&self, id: i32, payload: &Map<String, Value>) -> AppResult<Fine> {
        apply_update(&self.repository, &FINE_UPDATE, SqlValue::Int(id), payload).await?;
        self.repository.fines_get_by_id(id).await
    }

    pub async fn list_records(&self) -> AppResult<Vec<FineRecord>> {
        self.repository.fine_records_list().await
    }

    pub async fn get_record(&self, id: i32) -> AppResult<FineRecord> {
        self.repository.fine_records_get_by_id(id).await
    }

    pub async fn create_record(&self, data: CreateFineRecord) -> AppResult<FineRecord> {
        data.validate()?;
        if data.amount <= Decimal::ZERO {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }
        self.repository.fine_records_create(&data).await
    }

    pub async fn update_record(&self, id: i32, payload: &Map<String, Value>) -> AppResult<FineRecord> {
        apply_update(&self.repository, &FINE_RECORD_UPDATE, SqlValue::Int(id), payload).await?;
        self.repository.fine_records_get_by_id(id).await
    }
}
