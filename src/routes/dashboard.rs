use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::DashboardView,
    services::dashboard_service,
    state::{SharedState, countdown::Countdown},
};

/// Read-only dashboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/countdown", get(get_countdown))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses((status = 200, description = "Latest dashboard snapshot with the live countdown", body = DashboardView))
)]
/// Return the latest dashboard snapshot.
pub async fn get_dashboard(State(state): State<SharedState>) -> Json<DashboardView> {
    Json(dashboard_service::current_view(&state))
}

#[utoipa::path(
    get,
    path = "/countdown",
    tag = "dashboard",
    responses((status = 200, description = "Current countdown value", body = Countdown))
)]
/// Return the current countdown value.
pub async fn get_countdown(State(state): State<SharedState>) -> Json<Countdown> {
    Json(state.countdown().current())
}
