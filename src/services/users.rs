//! Registration, login and user profile service

use chrono::Utc;
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{
        AuthResponse, CreateUser, IdentityClaims, LoginRequest, NewUser, RefreshRequest, User, UserClaims,
    },
    repository::{
        partial_update::{apply_update, SqlValue},
        users::USER_UPDATE,
        Repository,
    },
    services::auth::{AuthService, TokenPair},
};

const BAD_CREDENTIALS: &str = "login or password is incorrect";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    auth: AuthService,
}

impl UsersService {
    pub fn new(repository: Repository, auth: AuthService) -> Self {
        Self { repository, auth }
    }

    /// Create a user and issue their first token pair
    pub async fn register(&self, data: CreateUser) -> AppResult<AuthResponse> {
        let data = data.normalized();
        data.validate()?;

        if self
            .repository
            .users_username_or_email_exists(&data.username, &data.email)
            .await?
        {
            return Err(AppError::Conflict("username or email already exists".to_string()));
        }

        let password_hash = self.auth.hash_password(&data.password)?;
        let user_id = AuthService::new_external_id();
        let identity = IdentityClaims {
            email: data.email.clone(),
            first_name: data.first_name.clone().unwrap_or_default(),
            last_name: data.last_name.clone().unwrap_or_default(),
            uid: user_id.clone(),
        };
        let pair = self.auth.issue_token_pair(&identity)?;

        let user = self
            .repository
            .users_create(&NewUser {
                user_id: &user_id,
                username: &data.username,
                email: &data.email,
                password_hash: &password_hash,
                first_name: data.first_name.as_deref(),
                last_name: data.last_name.as_deref(),
                phone_number: data.phone_number.as_deref(),
                token: &pair.access_token,
                refresh_token: &pair.refresh_token,
                now: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.user_id, "user registered");
        Ok(respond(user, pair))
    }

    /// Check credentials and replace the user's token pair
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let (username, password) = request
            .credentials()
            .ok_or_else(|| AppError::Validation("username and password are required".to_string()))?;

        let user = self
            .repository
            .users_find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !self.auth.verify_password(password, &user.password) {
            tracing::debug!(user_id = %user.user_id, "rejected login");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        self.reissue(user).await
    }

    /// Trade the current refresh token for a new pair
    pub async fn refresh(&self, request: RefreshRequest) -> AppResult<AuthResponse> {
        let claims = self.auth.validate_token(request.refresh_token.trim())?;

        let lookup = self.repository.users_get_by_uid(&claims.uid);
        let user = match self.auth.bounded("refresh token lookup", lookup).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized("token is invalid".to_string())),
            Err(e) => return Err(e),
        };

        if user.refresh_token.as_deref() != Some(request.refresh_token.trim()) {
            return Err(AppError::Unauthorized("token is invalid".to_string()));
        }

        self.reissue(user).await
    }

    async fn reissue(&self, user: User) -> AppResult<AuthResponse> {
        let pair = self.auth.issue_token_pair(&user.identity())?;
        self.auth
            .persist_token_pair(&self.repository, &user.user_id, &pair)
            .await?;
        Ok(respond(user, pair))
    }

    /// User behind a validated access token
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users_get_by_uid(&claims.uid).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users_list().await
    }

    pub async fn get(&self, user_id: &str) -> AppResult<User> {
        self.repository.users_get_by_uid(user_id).await
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.repository
            .users_find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// Partial profile update; returns the stored result
    pub async fn update(&self, user_id: &str, payload: &Map<String, Value>) -> AppResult<User> {
        apply_update(
            &self.repository,
            &USER_UPDATE,
            SqlValue::Text(Some(user_id.to_string())),
            payload,
        )
        .await?;
        self.repository.users_get_by_uid(user_id).await
    }
}

fn respond(user: User, pair: TokenPair) -> AuthResponse {
    AuthResponse {
        user,
        token: pair.access_token,
        refresh_token: pair.refresh_token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use std::time::Duration;

    fn auth() -> AuthService {
        let config = AuthConfig {
            hash_memory_kib: 1024,
            hash_iterations: 1,
            ..AuthConfig::default()
        };
        AuthService::new(&config, Duration::from_secs(5)).unwrap()
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        serde_json::from_value(serde_json::json!({ "username": username, "password": password })).unwrap()
    }

    #[test]
    fn test_login_accepts_password_as_registered() {
        let auth = auth();
        let registered: CreateUser = serde_json::from_value(serde_json::json!({
            "username": " alice ",
            "email": "alice@example.com",
            "password": "secret123 "
        }))
        .unwrap();
        let registered = registered.normalized();
        let stored = auth.hash_password(&registered.password).unwrap();

        let request = login_request("alice", "secret123 ");
        let (username, password) = request.credentials().unwrap();
        assert_eq!(username, registered.username);
        assert!(auth.verify_password(password, &stored));

        let request = login_request("alice", "wrong");
        let (_, password) = request.credentials().unwrap();
        assert!(!auth.verify_password(password, &stored));
    }

    #[test]
    fn test_blank_credentials_are_missing() {
        assert!(login_request("alice", "   ").credentials().is_none());
        assert!(login_request("  ", "secret123").credentials().is_none());
        assert!(login_request("", "").credentials().is_none());
    }
}
