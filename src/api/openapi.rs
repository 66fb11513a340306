//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, fines, health, orders, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::register,
        users::login,
        users::refresh,
        users::me,
        users::list_users,
        users::get_user,
        users::get_user_by_username,
        users::update_user,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::search_by_name,
        books::search_by_author,
        books::search_by_type,
        books::list_by_availability,
        books::update_book,
        // Fines
        fines::create_fine,
        fines::list_fines,
        fines::get_fine,
        fines::update_fine,
        fines::create_fine_record,
        fines::list_fine_records,
        fines::get_fine_record,
        fines::update_fine_record,
        // Orders
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
    ),
    components(
        schemas(
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::RefreshRequest,
            crate::models::user::AuthResponse,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::fine::Fine,
            crate::models::fine::CreateFine,
            crate::models::fine::FineRecord,
            crate::models::fine::CreateFineRecord,
            crate::models::order::Order,
            crate::models::order::OrderStatus,
            crate::models::order::CreateOrder,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration, login and users"),
        (name = "books", description = "Book catalog"),
        (name = "fines", description = "Fine types and fine records"),
        (name = "orders", description = "Borrow orders")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
