//! Registration, authentication and user endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::user::{AuthResponse, CreateUser, LoginRequest, RefreshRequest, User},
};

use super::{AuthenticatedUser, JsonBody, PathParam};

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    JsonBody(data): JsonBody<CreateUser>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.services.users.register(data).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing credentials", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.services.users.login(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/users/refresh",
    tag = "users",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<crate::AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.services.users.refresh(request).await?;
    Ok(Json(response))
}

/// Current user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.me(&claims).await?;
    Ok(Json(user))
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get user by external id
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "External user id")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(user_id): PathParam<String>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get(&user_id).await?;
    Ok(Json(user))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/users/name/{username}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_by_username(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(username): PathParam<String>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_username(&username).await?;
    Ok(Json(user))
}

/// Update profile fields of a user
///
/// Accepts any subset of `username`, `email`, `phone_number`, `first_name`,
/// `last_name`; other fields are ignored.
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "External user id")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "No valid fields or invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PathParam(user_id): PathParam<String>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update(&user_id, &payload).await?;
    Ok(Json(user))
}
