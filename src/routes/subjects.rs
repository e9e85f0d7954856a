use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dao::models::NewSubject, dto::subject::SubjectSummary, error::AppError,
    services::subject_service, state::SharedState,
};

/// Subject catalog endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/subjects", get(list_subjects).post(submit_subject))
}

#[utoipa::path(
    get,
    path = "/subjects",
    tag = "subjects",
    responses((status = 200, description = "Subject catalog", body = [SubjectSummary]))
)]
/// List the subjects available for adoption.
pub async fn list_subjects(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SubjectSummary>>, AppError> {
    let subjects = subject_service::list_subjects(&state).await?;
    Ok(Json(subjects))
}

#[utoipa::path(
    post,
    path = "/subjects",
    tag = "subjects",
    request_body = NewSubject,
    responses(
        (status = 201, description = "Subject created", body = SubjectSummary),
        (status = 400, description = "Incomplete subject")
    )
)]
/// Add a subject to the catalog.
pub async fn submit_subject(
    State(state): State<SharedState>,
    Json(subject): Json<NewSubject>,
) -> Result<(StatusCode, Json<SubjectSummary>), AppError> {
    let created = subject_service::submit_subject(&state, subject).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
