use std::sync::Arc;

use crate::dao::{
    backend::HackathonApi,
    error::ApiResult,
    models::{HackathonState, Status},
};

/// Accessor over the single status record.
#[derive(Clone)]
pub struct StatusService {
    api: Arc<dyn HackathonApi>,
    status_id: u64,
}

impl StatusService {
    /// Accessor for the status record `status_id`.
    pub fn new(api: Arc<dyn HackathonApi>, status_id: u64) -> Self {
        Self { api, status_id }
    }

    /// Backend this service writes to.
    pub fn api(&self) -> &Arc<dyn HackathonApi> {
        &self.api
    }

    /// Fetch the status record.
    pub async fn current(&self) -> ApiResult<Status> {
        self.api.get_status(self.status_id).await
    }

    /// Fetch only the lifecycle state.
    pub async fn current_state(&self) -> ApiResult<HackathonState> {
        self.current().await.map(|status| status.state)
    }

    /// Overwrite the lifecycle state, returning the record echoed by the backend.
    pub async fn update(&self, state: HackathonState) -> ApiResult<Status> {
        self.api.update_status(self.status_id, state).await
    }

    /// Mark the hackathon as WAITING.
    pub async fn set_waiting(&self) -> ApiResult<Status> {
        self.update(HackathonState::Waiting).await
    }

    /// Mark the hackathon as PREPARING.
    pub async fn set_preparing(&self) -> ApiResult<Status> {
        self.update(HackathonState::Preparing).await
    }

    /// Mark the hackathon as RUNNING.
    pub async fn set_running(&self) -> ApiResult<Status> {
        self.update(HackathonState::Running).await
    }

    /// Mark the hackathon as FINISHED.
    pub async fn set_finished(&self) -> ApiResult<Status> {
        self.update(HackathonState::Finished).await
    }
}
