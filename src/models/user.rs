//! User (identity) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    /// Stable external identifier, assigned once at registration
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Claims embedded in every token issued for this user
    pub fn identity(&self) -> IdentityClaims {
        IdentityClaims {
            email: self.email.clone(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            uid: self.user_id.clone(),
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(alias = "Password")]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "phonenumber")]
    pub phone_number: Option<String>,
}

impl CreateUser {
    /// Trim the fields that must not carry surrounding whitespace
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self.password = self.password.trim().to_string();
        self
    }
}

/// Row values for a new user, computed by the service
#[derive(Debug)]
pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub token: &'a str,
    pub refresh_token: &'a str,
    pub now: DateTime<Utc>,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

impl LoginRequest {
    /// Trimmed username and password (as in `CreateUser::normalized`), or
    /// `None` if either is blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }
}

/// Refresh request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// User along with a freshly issued token pair
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Identity claims carried by access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique per issued token
    pub jti: String,
}

impl UserClaims {
    pub fn identity(&self) -> IdentityClaims {
        IdentityClaims {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            uid: self.uid.clone(),
        }
    }
}
