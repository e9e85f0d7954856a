//! Dashboard projections published by the orchestrator and served over HTTP.

use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::{
    dao::models::{HackathonState, Period, Team},
    dto::subject::SubjectSummary,
    state::countdown::Countdown,
    time_utils::format_date_components,
};

/// Banner shown when the status itself could not be fetched.
pub const FETCH_ERROR_BANNER: &str = "unable to fetch dashboard data";

/// Team as rendered on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Backend identifier, when known.
    pub id: Option<u64>,
    /// Team name, or `Team <id>`.
    pub name: String,
    /// Comma-separated member names, or "No participants".
    pub members: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team
                .name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| match team.id {
                    Some(id) => format!("Team {id}"),
                    None => "Team".to_string(),
                }),
            members: team.members_display(),
        }
    }
}

/// Day numbers and French month names of a period, as shown on the period card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPeriod {
    /// Day of the month the period starts.
    pub start_day: String,
    /// Month the period starts.
    pub start_month: String,
    /// Day of the month the period ends.
    pub end_day: String,
    /// Month the period ends.
    pub end_month: String,
}

impl FormattedPeriod {
    /// Format both bounds; `None` when either is missing.
    pub fn from_period(period: &Period) -> Option<Self> {
        let start = format_date_components(period.start_date?);
        let end = format_date_components(period.end_date?);
        Some(Self {
            start_day: start.day,
            start_month: start.month.to_string(),
            end_day: end.day,
            end_month: end.month.to_string(),
        })
    }
}

/// Aggregate state of the dashboard after the latest orchestrator step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// `None` until the first successful status fetch.
    pub status: Option<HackathonState>,
    /// Registered participants.
    pub participants_count: usize,
    /// Registered jury members.
    pub jury_count: usize,
    /// Generated teams.
    pub teams: Vec<TeamSummary>,
    /// Current period record.
    pub period: Option<Period>,
    /// Period labels for the dashboard card.
    pub formatted_period: Option<FormattedPeriod>,
    /// Fractional days since the end of the last period.
    pub days_since_last_hackathon: Option<f64>,
    /// Subject of the current hackathon.
    pub subject: Option<SubjectSummary>,
    /// Identifier of the hackathon record, once generated.
    pub current_hackathon_id: Option<u64>,
    /// Whether teams and subject should be displayed.
    pub project_visible: bool,
    /// When the FINISHED data will be wiped.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub cleanup_at: Option<OffsetDateTime>,
    /// An aggregate load is in progress.
    pub loading: bool,
    /// Banner shown when the backend could not be read.
    pub error: Option<String>,
}

/// Snapshot enriched with the live countdown, returned by `GET /dashboard`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    /// Latest published snapshot.
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
    /// Live countdown.
    pub countdown: Countdown,
}
