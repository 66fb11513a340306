//! Credential and token management
//!
//! Password hashing (Argon2id, PHC strings), issuance and validation of
//! HS256 access/refresh token pairs, and persistence of the latest pair
//! issued to a user.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{IdentityClaims, UserClaims},
};

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("token is expired")]
    ExpiredToken,

    #[error("token is invalid")]
    InvalidToken,
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Hashing(_) | AuthError::Signing(_) => AppError::Internal(e.to_string()),
            AuthError::ExpiredToken | AuthError::InvalidToken => AppError::Unauthorized(e.to_string()),
        }
    }
}

/// Access and refresh token issued together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Storage for the current token pair of each user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Overwrite the stored pair, returning the number of users updated
    async fn store_token_pair(&self, user_id: &str, access_token: &str, refresh_token: &str) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct AuthService {
    argon2: Argon2<'static>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: ChronoDuration,
    refresh_ttl: ChronoDuration,
    datastore_timeout: Duration,
}

impl AuthService {
    pub fn new(config: &AuthConfig, datastore_timeout: Duration) -> Result<Self, AuthError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: ChronoDuration::hours(config.access_token_hours),
            refresh_ttl: ChronoDuration::days(config.refresh_token_days),
            datastore_timeout,
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// A hash that cannot be parsed never matches.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    pub fn issue_token_pair(&self, identity: &IdentityClaims) -> Result<TokenPair, AuthError> {
        self.issue_token_pair_at(identity, Utc::now())
    }

    /// Issue a pair as if the current time were `now`
    pub fn issue_token_pair_at(&self, identity: &IdentityClaims, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.sign(identity, now, now + self.access_ttl)?,
            refresh_token: self.sign(identity, now, now + self.refresh_ttl)?,
        })
    }

    fn sign(&self, identity: &IdentityClaims, issued: DateTime<Utc>, expires: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = UserClaims {
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            uid: identity.uid.clone(),
            exp: expires.timestamp(),
            iat: issued.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify the signature and decode the claims.
    ///
    /// Expiry is checked again after decoding, so a token whose `exp` has
    /// been reached is rejected whatever the decoder concluded.
    pub fn validate_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<UserClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(data.claims)
    }

    /// Replace the stored pair for `user_id`.
    ///
    /// Fails with `NotFound` when the user no longer exists and with
    /// `DatastoreTimeout` when the store does not answer in time.
    pub async fn persist_token_pair<S>(&self, store: &S, user_id: &str, pair: &TokenPair) -> AppResult<()>
    where
        S: TokenStore + ?Sized,
    {
        let write = store.store_token_pair(user_id, &pair.access_token, &pair.refresh_token);
        let affected = self.bounded("token persistence", write).await?;

        if affected == 0 {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        Ok(())
    }

    /// Run a datastore call under the configured timeout
    pub async fn bounded<T, F>(&self, operation: &str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.datastore_timeout, call)
            .await
            .map_err(|_| AppError::DatastoreTimeout(operation.to_string()))?
    }

    /// New opaque external identifier for a user
    pub fn new_external_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
            ..AuthConfig::default()
        }
    }

    fn service() -> AuthService {
        AuthService::new(&test_config(), Duration::from_secs(5)).unwrap()
    }

    fn alice() -> IdentityClaims {
        IdentityClaims {
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            uid: "3f1c2a9e-0000-4000-8000-000000000001".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let auth = service();
        let hash = auth.hash_password("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(auth.verify_password("secret123", &hash));
        assert!(!auth.verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let auth = service();
        let first = auth.hash_password("secret123").unwrap();
        let second = auth.hash_password("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_corrupt_hash_does_not_verify() {
        let auth = service();
        assert!(!auth.verify_password("secret123", "not-a-phc-string"));
        assert!(!auth.verify_password("secret123", ""));
    }

    #[test]
    fn test_bad_hash_params_rejected() {
        let config = AuthConfig {
            hash_parallelism: 0,
            ..test_config()
        };
        assert!(matches!(
            AuthService::new(&config, Duration::from_secs(5)),
            Err(AuthError::Hashing(_))
        ));
    }

    #[test]
    fn test_issue_then_validate_round_trips_claims() {
        let auth = service();
        let now = Utc::now();
        let pair = auth.issue_token_pair_at(&alice(), now).unwrap();

        let access = auth.validate_token(&pair.access_token).unwrap();
        assert_eq!(access.identity(), alice());
        assert_eq!(access.iat, now.timestamp());
        assert_eq!(access.exp, (now + ChronoDuration::hours(24)).timestamp());

        let refresh = auth.validate_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.identity(), alice());
        assert_eq!(refresh.exp, (now + ChronoDuration::days(7)).timestamp());
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_pairs_issued_in_same_second_differ() {
        let auth = service();
        let now = Utc::now();
        let first = auth.issue_token_pair_at(&alice(), now).unwrap();
        let second = auth.issue_token_pair_at(&alice(), now).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);

        let a = auth.validate_token(&first.refresh_token).unwrap();
        let b = auth.validate_token(&second.refresh_token).unwrap();
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token() {
        let auth = service();
        let pair = auth
            .issue_token_pair_at(&alice(), Utc::now() - ChronoDuration::days(8))
            .unwrap();

        assert_eq!(auth.validate_token(&pair.access_token), Err(AuthError::ExpiredToken));
        assert_eq!(auth.validate_token(&pair.refresh_token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn test_token_expiring_now_is_expired() {
        let auth = service();
        let now = Utc::now();
        let token = auth.sign(&alice(), now - ChronoDuration::hours(1), now).unwrap();
        assert_eq!(auth.validate_token(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn test_foreign_or_garbled_token_is_invalid() {
        let auth = service();
        let other = AuthService::new(
            &AuthConfig {
                jwt_secret: "another-secret".to_string(),
                ..test_config()
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let pair = other.issue_token_pair(&alice()).unwrap();
        assert_eq!(auth.validate_token(&pair.access_token), Err(AuthError::InvalidToken));
        assert_eq!(auth.validate_token("a.b.c"), Err(AuthError::InvalidToken));
        assert_eq!(auth.validate_token(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        assert!(matches!(AppError::from(AuthError::ExpiredToken), AppError::Unauthorized(msg) if msg == "token is expired"));
        assert!(matches!(AppError::from(AuthError::InvalidToken), AppError::Unauthorized(msg) if msg == "token is invalid"));
        assert!(matches!(AppError::from(AuthError::Signing("x".into())), AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_persist_writes_pair_for_user() {
        let auth = service();
        let pair = auth.issue_token_pair(&alice()).unwrap();
        let expected = pair.clone();

        let mut store = MockTokenStore::new();
        store
            .expect_store_token_pair()
            .withf(move |uid, access, refresh| {
                uid == "u-1" && *access == expected.access_token && *refresh == expected.refresh_token
            })
            .times(1)
            .returning(|_, _, _| Ok(1));

        auth.persist_token_pair(&store, "u-1", &pair).await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_for_missing_user_is_not_found() {
        let auth = service();
        let pair = auth.issue_token_pair(&alice()).unwrap();

        let mut store = MockTokenStore::new();
        store.expect_store_token_pair().times(1).returning(|_, _, _| Ok(0));

        let err = auth.persist_token_pair(&store, "gone", &pair).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    struct StalledStore;

    #[async_trait]
    impl TokenStore for StalledStore {
        async fn store_token_pair(&self, _: &str, _: &str, _: &str) -> AppResult<u64> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        }
    }

    #[tokio::test]
    async fn test_persist_times_out_on_stalled_store() {
        let auth = AuthService::new(&test_config(), Duration::from_millis(20)).unwrap();
        let pair = auth.issue_token_pair(&alice()).unwrap();

        let err = auth.persist_token_pair(&StalledStore, "u-1", &pair).await.unwrap_err();
        assert!(matches!(err, AppError::DatastoreTimeout(_)));
    }

    #[tokio::test]
    async fn test_bounded_lookup_times_out() {
        let auth = AuthService::new(&test_config(), Duration::from_millis(20)).unwrap();
        let stalled = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, AppError>(1)
        };

        let err = auth.bounded("refresh token lookup", stalled).await.unwrap_err();
        assert!(matches!(err, AppError::DatastoreTimeout(op) if op == "refresh token lookup"));

        let value = auth.bounded("quick", async { Ok::<_, AppError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_external_ids_are_unique() {
        let a = AuthService::new_external_id();
        let b = AuthService::new_external_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }
}
