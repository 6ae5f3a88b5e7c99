//! People endpoints, served under both `/usuarios` and `/empleados`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Document, NewPerson},
    AppState,
};

use super::{CreatedResponse, JsonBody, MergeFields, MessageResponse};

/// List every person
#[utoipa::path(
    get,
    path = "/usuarios/lista",
    tag = "usuarios",
    responses(
        (status = 200, description = "All people", body = Vec<Document>)
    )
)]
pub async fn list_people(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let people = state.services.people.list().await?;
    Ok(Json(people))
}

/// Get a person by id
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    tag = "usuarios",
    params(
        ("id" = String, Path, description = "Person ID (authentication principal id)")
    ),
    responses(
        (status = 200, description = "Person", body = Document),
        (status = 404, description = "Person not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let person = state.services.people.get(&id).await?;
    Ok(Json(person))
}

/// Create a person together with its authentication principal
#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "usuarios",
    request_body = NewPerson,
    responses(
        (status = 201, description = "Person created; id is the principal id", body = CreatedResponse),
        (status = 400, description = "Missing field or DNI not 8 characters", body = crate::error::ErrorResponse),
        (status = 500, description = "Principal or document could not be written", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_person(
    State(state): State<AppState>,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let person: NewPerson = body.into_record()?;
    let id = state.services.people.create(person).await?.into_result()?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Merge fields into a person
#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    tag = "usuarios",
    params(
        ("id" = String, Path, description = "Person ID")
    ),
    request_body = MergeFields,
    responses(
        (status = 200, description = "Person updated", body = MessageResponse)
    )
)]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> AppResult<Json<MessageResponse>> {
    state.services.people.update(&id, body.into_fields()?).await?;
    Ok(Json(MessageResponse::new("Usuario actualizado")))
}

/// Delete a person and its authentication principal
#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    tag = "usuarios",
    params(
        ("id" = String, Path, description = "Person ID")
    ),
    responses(
        (status = 204, description = "Person and principal deleted"),
        (status = 500, description = "Document or principal could not be deleted", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.people.delete(&id).await.into_result()?;
    Ok(StatusCode::NO_CONTENT)
}
