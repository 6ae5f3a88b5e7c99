//! API handlers for the Biblioteca REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod people;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    routing::{delete, get, post},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Fields, REQUIRED_FIELDS_MESSAGE},
    AppState,
};

/// Identifier of a newly created record
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Result of a bulk creation
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreatedResponse {
    pub message: String,
    /// Generated ids, in request order
    pub ids: Vec<String>,
}

/// Partial record for merge updates; any subset of fields, unvalidated
#[derive(Debug, ToSchema)]
pub struct MergeFields(#[schema(value_type = Object)] pub Fields);

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Extractor for a JSON request body.
///
/// A body without a JSON content type, or an empty one, reads as `{}`.
/// A payload of the wrong shape fails required-field validation.
pub struct JsonBody(pub Value);

#[async_trait]
impl FromRequest<AppState> for JsonBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Fields::new())));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))
    }
}

impl JsonBody {
    /// A single record; anything but an object is missing every field
    pub fn into_record<T: DeserializeOwned>(self) -> AppResult<T> {
        record_from_value(self.0)
    }

    /// A list of records; every element must be an object
    pub fn into_records<T: DeserializeOwned>(self) -> AppResult<Vec<T>> {
        match self.0 {
            Value::Array(items) => items.into_iter().map(record_from_value).collect(),
            _ => Err(missing_fields()),
        }
    }

    /// Fields for a merge update
    pub fn into_fields(self) -> AppResult<Fields> {
        match self.0 {
            Value::Object(fields) => Ok(fields),
            _ => Err(AppError::Validation(
                "El cuerpo debe ser un objeto JSON".to_string(),
            )),
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn record_from_value<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    match value {
        Value::Object(_) => serde_json::from_value(value).map_err(|_| missing_fields()),
        _ => Err(missing_fields()),
    }
}

fn missing_fields() -> AppError {
    AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/", get(health::root))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/libros", get(books::list_books).post(books::create_book))
        .route("/libros/lista", get(books::list_books))
        .route("/libros/bulk", post(books::bulk_create_books))
        .route("/libros/delete/:id", delete(books::delete_book))
        .route(
            "/libros/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // People (users / employees)
        .route("/usuarios", get(people::list_people).post(people::create_person))
        .route("/usuarios/lista", get(people::list_people))
        .route("/usuarios/delete/:id", delete(people::delete_person))
        .route(
            "/usuarios/:id",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
        .route("/empleados", get(people::list_people).post(people::create_person))
        .route(
            "/empleados/:id",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
        // Loans
        .route("/prestamos", get(loans::list_loans).post(loans::create_loan))
        .route("/prestamos/lista", get(loans::list_loans))
        .route("/prestamos/bulk", post(loans::bulk_create_loans))
        .route("/prestamos/delete/:id", delete(loans::delete_loan))
        .route(
            "/prestamos/:id",
            get(loans::get_loan)
                .put(loans::update_loan)
                .delete(loans::delete_loan),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
