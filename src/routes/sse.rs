use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/countdown",
    tag = "sse",
    responses((status = 200, description = "Countdown ticks", content_type = "text/event-stream", body = String))
)]
/// Stream countdown ticks, starting with the current value.
pub async fn countdown_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    info!("New countdown SSE connection");
    sse_service::to_sse_stream(sse_service::subscribe_countdown(&state))
}

#[utoipa::path(
    get,
    path = "/sse/dashboard",
    tag = "sse",
    responses((status = 200, description = "Dashboard snapshots and countdown ticks", content_type = "text/event-stream", body = String))
)]
/// Stream dashboard snapshots alongside countdown ticks.
pub async fn dashboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    info!("New dashboard SSE connection");
    sse_service::to_sse_stream(sse_service::subscribe_dashboard(&state))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/countdown", get(countdown_stream))
        .route("/sse/dashboard", get(dashboard_stream))
}
