#[cfg(test)]
pub mod memory;
pub mod rest;

use std::fmt;

use futures::future::BoxFuture;

use crate::dao::{
    error::ApiResult,
    models::{
        GenerateResponse, HackathonRecord, HackathonState, JuryMember, NewJuryMember,
        NewParticipant, NewSubject, Participant, Period, Status, Subject, Team,
    },
};

/// Collections wiped at the end of a cycle through their bulk-delete endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkCollection {
    Hackathons,
    Teams,
    JuryMembers,
    Participants,
}

impl BulkCollection {
    /// Deletion order: each collection is only unreferenced once the previous one is gone.
    pub const CLEANUP_ORDER: [BulkCollection; 4] = [
        BulkCollection::Hackathons,
        BulkCollection::Teams,
        BulkCollection::JuryMembers,
        BulkCollection::Participants,
    ];

    /// Resource path segment of the collection.
    pub fn resource(self) -> &'static str {
        match self {
            BulkCollection::Hackathons => "hackathons",
            BulkCollection::Teams => "teams",
            BulkCollection::JuryMembers => "jury-members",
            BulkCollection::Participants => "participants",
        }
    }
}

impl fmt::Display for BulkCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

/// Notification mails the backend can send after a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    /// Sent while the next cycle is not scheduled yet.
    PreInvitation,
    /// Sent once a cycle is scheduled.
    Invitation,
}

impl MailKind {
    /// Mail matching the state the registration happened in.
    pub fn for_state(state: HackathonState) -> Self {
        match state {
            HackathonState::Waiting => MailKind::PreInvitation,
            _ => MailKind::Invitation,
        }
    }

    /// Endpoint name under `/mails`.
    pub fn endpoint(self) -> &'static str {
        match self {
            MailKind::PreInvitation => "sendPreInvitation",
            MailKind::Invitation => "sendInvitation",
        }
    }
}

/// Abstraction over the hackathon REST backend.
pub trait HackathonApi: Send + Sync {
    /// Status record `id`.
    fn get_status(&self, id: u64) -> BoxFuture<'static, ApiResult<Status>>;
    /// Write `state` to status record `id`.
    fn update_status(&self, id: u64, state: HackathonState) -> BoxFuture<'static, ApiResult<Status>>;
    /// Period record `id`; `None` when the backend has none.
    fn get_period(&self, id: u64) -> BoxFuture<'static, ApiResult<Option<Period>>>;
    /// Replace period record `id`.
    fn update_period(&self, id: u64, period: Period) -> BoxFuture<'static, ApiResult<Period>>;
    /// Create a period record.
    fn create_period(&self, period: Period) -> BoxFuture<'static, ApiResult<Period>>;
    /// Every registered participant.
    fn list_participants(&self) -> BoxFuture<'static, ApiResult<Vec<Participant>>>;
    /// Every registered jury member.
    fn list_jury_members(&self) -> BoxFuture<'static, ApiResult<Vec<JuryMember>>>;
    /// Every generated team.
    fn list_teams(&self) -> BoxFuture<'static, ApiResult<Vec<Team>>>;
    /// Subject catalog.
    fn list_subjects(&self) -> BoxFuture<'static, ApiResult<Vec<Subject>>>;
    /// Every hackathon record.
    fn list_hackathons(&self) -> BoxFuture<'static, ApiResult<Vec<HackathonRecord>>>;
    /// Ask the backend to partition registered participants into teams.
    fn generate_hackathon(&self) -> BoxFuture<'static, ApiResult<GenerateResponse>>;
    /// Subject tied to a hackathon through its jury-member association.
    fn hackathon_subject(&self, hackathon_id: u64) -> BoxFuture<'static, ApiResult<Option<Subject>>>;
    /// Delete every record of `collection`.
    fn delete_all(&self, collection: BulkCollection) -> BoxFuture<'static, ApiResult<()>>;
    /// Register a participant.
    fn create_participant(&self, participant: NewParticipant) -> BoxFuture<'static, ApiResult<()>>;
    /// Register a jury member.
    fn create_jury_member(&self, jury_member: NewJuryMember) -> BoxFuture<'static, ApiResult<()>>;
    /// Submit a subject idea.
    fn create_subject(&self, subject: NewSubject) -> BoxFuture<'static, ApiResult<Subject>>;
    /// Send a mail of `kind` to `email`.
    fn send_mail(&self, kind: MailKind, email: String) -> BoxFuture<'static, ApiResult<()>>;
}
