//! Fine type and fine record endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::fine::{CreateFine, CreateFineRecord, Fine, FineRecord},
};

use super::{AuthenticatedUser, JsonBody, PathParam};

/// Create a fine type
#[utoipa::path(
    post,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    request_body = CreateFine,
    responses(
        (status = 201, description = "Fine created", body = Fine),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateFine>,
) -> AppResult<(StatusCode, Json<Fine>)> {
    let fine = state.services.fines.create(data).await?;
    Ok((StatusCode::CREATED, Json(fine)))
}

#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All fine types", body = Vec<Fine>))
)]
pub async fn list_fines(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Fine>>> {
    let fines = state.services.fines.list().await?;
    Ok(Json(fines))
}

#[utoipa::path(
    get,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Fine type", body = Fine),
        (status = 404, description = "Fine not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Fine>> {
    let fine = state.services.fines.get_by_id(id).await?;
    Ok(Json(fine))
}

/// Update `name` and/or `amount` of a fine type
#[utoipa::path(
    put,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Updated fine type", body = Fine),
        (status = 400, description = "No valid fields or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Fine not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AppResult<Json<Fine>> {
    let fine = state.services.fines.update(id, &payload).await?;
    Ok(Json(fine))
}

/// Charge a fine
#[utoipa::path(
    post,
    path = "/fine-records",
    tag = "fines",
    security(("bearer_auth" = [])),
    request_body = CreateFineRecord,
    responses(
        (status = 201, description = "Fine record created", body = FineRecord),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_fine_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateFineRecord>,
) -> AppResult<(StatusCode, Json<FineRecord>)> {
    let record = state.services.fines.create_record(data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List fine records (first 1000)
#[utoipa::path(
    get,
    path = "/fine-records",
    tag = "fines",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Fine records", body = Vec<FineRecord>))
)]
pub async fn list_fine_records(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<FineRecord>>> {
    let records = state.services.fines.list_records().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/fine-records/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine record ID")),
    responses(
        (status = 200, description = "Fine record", body = FineRecord),
        (status = 404, description = "Fine record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_fine_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<FineRecord>> {
    let record = state.services.fines.get_record(id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/fine-records/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine record ID")),
    responses(
        (status = 200, description = "Updated fine record", body = FineRecord),
        (status = 400, description = "No valid fields or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Fine record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_fine_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AppResult<Json<FineRecord>> {
    let record = state.services.fines.update_record(id, &payload).await?;
    Ok(Json(record))
}
