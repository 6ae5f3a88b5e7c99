//! Loan endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Document, NewLoan},
    AppState,
};

use super::{BulkCreatedResponse, CreatedResponse, JsonBody, MergeFields, MessageResponse};

/// List every loan
#[utoipa::path(
    get,
    path = "/prestamos",
    tag = "prestamos",
    responses(
        (status = 200, description = "All loans", body = Vec<Document>)
    )
)]
pub async fn list_loans(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// Get a loan by id
#[utoipa::path(
    get,
    path = "/prestamos/{id}",
    tag = "prestamos",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Document),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let loan = state.services.loans.get(&id).await?;
    Ok(Json(loan))
}

/// Create a loan
#[utoipa::path(
    post,
    path = "/prestamos",
    tag = "prestamos",
    request_body = NewLoan,
    responses(
        (status = 201, description = "Loan created", body = CreatedResponse),
        (status = 400, description = "Missing required field", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let loan: NewLoan = body.into_record()?;
    let id = state.services.loans.create(loan).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Merge fields into a loan
#[utoipa::path(
    put,
    path = "/prestamos/{id}",
    tag = "prestamos",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    request_body = MergeFields,
    responses(
        (status = 200, description = "Loan updated", body = MessageResponse)
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> AppResult<Json<MessageResponse>> {
    state.services.loans.update(&id, body.into_fields()?).await?;
    Ok(Json(MessageResponse::new("Préstamo actualizado")))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/prestamos/{id}",
    tag = "prestamos",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Loan deleted (or already absent)")
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.loans.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create several loans; all are validated before any is stored
#[utoipa::path(
    post,
    path = "/prestamos/bulk",
    tag = "prestamos",
    request_body = Vec<NewLoan>,
    responses(
        (status = 201, description = "Loans created", body = BulkCreatedResponse),
        (status = 400, description = "A loan is missing a required field", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_create_loans(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<BulkCreatedResponse>)> {
    let loans: Vec<NewLoan> = body.into_records()?;
    let ids = state.services.loans.bulk_create(loans).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreatedResponse {
            message: "Préstamos añadidos correctamente".to_string(),
            ids,
        }),
    ))
}
