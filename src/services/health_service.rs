use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Query the backend status endpoint, reporting degraded when it is unreachable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.status_service().current_state().await {
        Ok(current) => HealthResponse::ok(current),
        Err(err) => {
            warn!(error = %err, "backend health check failed");
            HealthResponse::degraded()
        }
    }
}
