use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::HackathonState;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Lifecycle state reported by the backend, when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<HackathonState>,
}

impl HealthResponse {
    /// The backend answered with `state`.
    pub fn ok(state: HackathonState) -> Self {
        Self {
            status: "ok".to_string(),
            state: Some(state),
        }
    }

    /// The backend status endpoint could not be reached.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            state: None,
        }
    }
}
