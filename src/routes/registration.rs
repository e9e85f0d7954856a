use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::registration::{RegistrationRequest, RegistrationResponse},
    error::AppError,
    services::registration_service,
    state::SharedState,
};

/// Registration endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/registrations", post(create_registration))
}

#[utoipa::path(
    post,
    path = "/registrations",
    tag = "registration",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration accepted", body = RegistrationResponse),
        (status = 400, description = "Invalid registration form"),
        (status = 409, description = "Registrations are closed"),
        (status = 502, description = "Backend rejected the registration")
    )
)]
/// Register a participant or jury member.
pub async fn create_registration(
    State(state): State<SharedState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    let response = registration_service::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
