//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, categories, chat, health, publishers, reports, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Borrowing
        borrows::query_page,
        borrows::borrow,
        borrows::return_borrow,
        borrows::renew,
        // Books
        books::query_page,
        books::available,
        books::get,
        books::add,
        books::update,
        books::change_status,
        books::delete,
        // Users
        users::query_page,
        users::get,
        users::add,
        users::update,
        users::change_status,
        users::delete,
        // Categories
        categories::list,
        categories::query_page,
        categories::add,
        categories::update,
        categories::delete,
        // Publishers
        publishers::list,
        publishers::query_page,
        publishers::add,
        publishers::update,
        publishers::delete,
        // Reports
        reports::summary,
        reports::book_stats,
        reports::borrow_trend,
        // Chat
        chat::stream,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::MeResponse,
            // Borrowing
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRecordDto,
            crate::models::borrow::BorrowRequest,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBookRequest,
            crate::models::book::UpdateBookRequest,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUserRequest,
            crate::models::user::UpdateUserRequest,
            // Categories / publishers
            crate::models::category::Category,
            crate::models::category::CategoryRequest,
            crate::models::publisher::Publisher,
            crate::models::publisher::PublisherRequest,
            // Reports
            crate::services::reports::BookSummary,
            crate::services::reports::ChartPoint,
            // Chat
            chat::ChatRequest,
            // Envelopes
            crate::api::OkMessage,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin authentication"),
        (name = "borrow", description = "Borrowing lifecycle"),
        (name = "book", description = "Catalog management"),
        (name = "user", description = "Patron management"),
        (name = "category", description = "Category management"),
        (name = "publisher", description = "Publisher management"),
        (name = "report", description = "Reporting"),
        (name = "chat", description = "AI chat assistant")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
