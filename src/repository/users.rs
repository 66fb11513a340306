//! User domain methods on Repository

use async_trait::async_trait;
use chrono::Utc;

use super::{
    constraint_error,
    partial_update::{self as pu, FieldSpec, UpdateTarget},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User},
    services::auth::TokenStore,
};

/// Profile columns a user may change; tokens, password and identifiers never
/// appear here.
pub static USER_UPDATE: UpdateTarget = UpdateTarget {
    entity: "user",
    table: "users",
    key_column: "user_id",
    touch_column: Some("updated_at"),
    fields: &[
        FieldSpec::new("username", "username", pu::required_text),
        FieldSpec::new("email", "email", pu::email),
        FieldSpec::new("phone_number", "phone_number", pu::nullable_text),
        FieldSpec::new("first_name", "first_name", pu::nullable_text),
        FieldSpec::new("last_name", "last_name", pu::nullable_text),
    ],
};

impl Repository {
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get user by external identifier
    pub async fn users_get_by_uid(&self, user_id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// Get user by username (used by login)
    pub async fn users_find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if the username or the email is already taken
    pub async fn users_username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR LOWER(email) = LOWER($2))",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn users_create(&self, user: &NewUser<'_>) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                user_id, username, email, password, first_name, last_name,
                phone_number, token, refresh_token, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(user.user_id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.phone_number)
        .bind(user.token)
        .bind(user.refresh_token)
        .bind(user.now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "username or email already exists"))
    }
}

#[async_trait]
impl TokenStore for Repository {
    async fn store_token_pair(&self, user_id: &str, access_token: &str, refresh_token: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET token = $1, refresh_token = $2, updated_at = $3 WHERE user_id = $4",
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::partial_update::{build_update, SqlValue, UpdateError};
    use serde_json::json;

    #[test]
    fn test_credentials_are_not_updatable() {
        let payload = json!({ "password": "new", "token": "t", "refresh_token": "r", "user_id": "x" });
        let err = build_update(&USER_UPDATE, SqlValue::Text(Some("u1".into())), payload.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err, UpdateError::NoFieldsProvided);
    }

    #[test]
    fn test_profile_update_touches_updated_at() {
        let payload = json!({ "first_name": "Ada", "email": "ada@example.com" });
        let stmt = build_update(&USER_UPDATE, SqlValue::Text(Some("u1".into())), payload.as_object().unwrap())
            .unwrap();

        assert_eq!(
            stmt.sql(),
            "UPDATE users SET email = $1, first_name = $2, updated_at = $3 WHERE user_id = $4"
        );
        assert_eq!(stmt.args()[3], SqlValue::Text(Some("u1".into())));
    }

    #[test]
    fn test_bad_email_rejected() {
        let payload = json!({ "email": "not-an-email" });
        let err = build_update(&USER_UPDATE, SqlValue::Text(Some("u1".into())), payload.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidField { field: "email", .. }));
    }
}
