//! Business logic services

pub mod auth;
pub mod books;
pub mod fines;
pub mod orders;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub fines: fines::FinesService,
    pub orders: orders::OrdersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Result<Self, auth::AuthError> {
        let auth = auth::AuthService::new(&config.auth, config.database.timeout())?;

        Ok(Self {
            users: users::UsersService::new(repository.clone(), auth.clone()),
            books: books::BooksService::new(repository.clone()),
            fines: fines::FinesService::new(repository.clone()),
            orders: orders::OrdersService::new(repository.clone()),
            auth,
            repository,
        })
    }

    /// Readiness of the datastore
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
