//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, people};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Books, staff and loans REST API backed by Firestore",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::bulk_create_books,
        // People
        people::list_people,
        people::get_person,
        people::create_person,
        people::update_person,
        people::delete_person,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::update_loan,
        loans::delete_loan,
        loans::bulk_create_loans,
    ),
    components(
        schemas(
            crate::models::Document,
            crate::models::NewBook,
            crate::models::NewPerson,
            crate::models::NewLoan,
            crate::api::CreatedResponse,
            crate::api::MessageResponse,
            crate::api::BulkCreatedResponse,
            crate::api::MergeFields,
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "libros", description = "Book catalogue"),
        (name = "usuarios", description = "Library staff (also served under /empleados)"),
        (name = "prestamos", description = "Loans")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
