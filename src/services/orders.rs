//! Borrow order service

use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    error::AppResult,
    models::order::{CreateOrder, Order},
    repository::{
        orders::ORDER_UPDATE,
        partial_update::{apply_update, SqlValue},
        Repository,
    },
};

#[derive(Clone)]
pub struct OrdersService {
    repository: Repository,
}

impl OrdersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Order>> {
        self.repository.orders_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Order> {
        self.repository.orders_get_by_id(id).await
    }

    pub async fn create(&self, data: CreateOrder) -> AppResult<Order> {
        data.validate()?;
        self.repository.orders_create(&data).await
    }

    pub async fn update(&self, id: i32, payload: &Map<String, Value>) -> AppResult<Order> {
        apply_update(&self.repository, &ORDER_UPDATE, SqlValue::Int(id), payload).await?;
        self.repository.orders_get_by_id(id).await
    }
}
