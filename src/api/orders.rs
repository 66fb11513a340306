//! Borrow order endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::order::{CreateOrder, Order},
};

use super::{AuthenticatedUser, JsonBody, PathParam};

/// Record a borrow
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.services.orders.create(data).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All orders", body = Vec<Order>))
)]
pub async fn list_orders(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.services.orders.list().await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = Order),
        (status = 404, description = "Order not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders.get_by_id(id).await?;
    Ok(Json(order))
}

/// Update an order
///
/// Accepts any subset of `person_id`, `book_id`, `borrow_date`,
/// `return_date`, `actual_return_date`, `status`. Dates are `YYYY-MM-DD`;
/// the return dates may be cleared with `null`.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "No valid fields or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders.update(id, &payload).await?;
    Ok(Json(order))
}
