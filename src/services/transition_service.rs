use thiserror::Error;
use tracing::info;

use crate::{
    dao::{
        error::{ApiError, ApiResult},
        models::{HackathonState, Status, Team},
    },
    services::status_service::StatusService,
};

/// Failure of a composite transition, naming the step that failed.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The status write was refused or did not reach the backend.
    #[error("failed to set status to {target}")]
    StatusUpdate {
        /// State the transition was moving to.
        target: HackathonState,
        /// Backend failure.
        #[source]
        source: ApiError,
    },
    /// `POST /hackathons/generate` failed; the status was not touched.
    #[error("team generation failed")]
    TeamGeneration(#[source] ApiError),
}

/// Result of moving to RUNNING.
#[derive(Debug, Clone)]
pub struct RunningTransition {
    /// Status record echoed by the backend.
    pub status: Status,
    /// Teams produced by the generation step.
    pub teams: Vec<Team>,
}

/// Backend-side lifecycle transitions. Legality is decided by the caller.
#[derive(Clone)]
pub struct StatusTransitions {
    status: StatusService,
}

impl StatusTransitions {
    /// Transitions writing through `status`.
    pub fn new(status: StatusService) -> Self {
        Self { status }
    }

    fn applied(target: HackathonState, result: ApiResult<Status>) -> Result<Status, TransitionError> {
        let status = result.map_err(|source| TransitionError::StatusUpdate { target, source })?;
        info!(state = %status.state, "hackathon status updated");
        Ok(status)
    }

    /// WAITING to PREPARING.
    pub async fn to_preparation(&self) -> Result<Status, TransitionError> {
        Self::applied(HackathonState::Preparing, self.status.set_preparing().await)
    }

    /// Generate teams, then mark the hackathon as running.
    ///
    /// The status is left untouched when generation fails. A failed status
    /// update after a successful generation is not rolled back.
    pub async fn to_running(&self) -> Result<RunningTransition, TransitionError> {
        let generated = self
            .status
            .api()
            .generate_hackathon()
            .await
            .map_err(TransitionError::TeamGeneration)?;
        info!(teams = generated.teams.len(), "teams generated");

        let status = Self::applied(HackathonState::Running, self.status.set_running().await)?;
        Ok(RunningTransition {
            status,
            teams: generated.teams,
        })
    }

    /// RUNNING to FINISHED.
    pub async fn to_finished(&self) -> Result<Status, TransitionError> {
        Self::applied(HackathonState::Finished, self.status.set_finished().await)
    }

    /// FINISHED back to WAITING, opening the next cycle.
    pub async fn to_waiting(&self) -> Result<Status, TransitionError> {
        Self::applied(HackathonState::Waiting, self.status.set_waiting().await)
    }
}
