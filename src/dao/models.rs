//! Wire models exchanged with the hackathon REST backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DefaultOnNull, OneOrMany, formats::PreferOne, serde_as};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::required_text;

/// Server-authoritative lifecycle phase of the current hackathon cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HackathonState {
    /// Registrations are open and the next cycle is not scheduled yet.
    #[serde(alias = "EN_ATTENTE")]
    Waiting,
    /// A period is scheduled and the countdown to its start is running.
    #[serde(alias = "EN_PREPARATION")]
    Preparing,
    /// Teams are generated and the hackathon is underway.
    #[serde(alias = "EN_COURS")]
    Running,
    /// The period ended; cycle data is waiting for cleanup.
    #[serde(alias = "TERMINE")]
    Finished,
}

impl HackathonState {
    /// Wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            HackathonState::Waiting => "WAITING",
            HackathonState::Preparing => "PREPARING",
            HackathonState::Running => "RUNNING",
            HackathonState::Finished => "FINISHED",
        }
    }

    /// Registrations close once the hackathon is running.
    pub fn accepts_registrations(self) -> bool {
        matches!(self, HackathonState::Waiting | HackathonState::Preparing)
    }

    /// Teams and the working subject are only meaningful while running or finished.
    pub fn shows_project(self) -> bool {
        matches!(self, HackathonState::Running | HackathonState::Finished)
    }
}

impl fmt::Display for HackathonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record stored under a well-known identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Current lifecycle phase.
    pub state: HackathonState,
}

/// Scheduled start/end window of one hackathon cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Start of the hackathon.
    #[serde(default, with = "iso_datetime::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_date: Option<OffsetDateTime>,
    /// End of the hackathon.
    #[serde(default, with = "iso_datetime::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<OffsetDateTime>,
}

/// Registered hackathon participant.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Declared skills.
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferOne>>")]
    #[serde(default)]
    pub skill: Vec<String>,
}

impl Participant {
    /// "First Last" with missing parts dropped.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Registered jury member, optionally carrying the idea they proposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JuryMember {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Idea title.
    #[serde(default)]
    pub title: String,
    /// Idea description.
    #[serde(default)]
    pub description: String,
    /// Problem the idea addresses.
    #[serde(default)]
    pub problem: String,
    /// What is new about the idea.
    #[serde(default)]
    pub innovation: String,
}

/// Team members come back either as plain names or as participant objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamMember {
    /// Bare member name.
    Name(String),
    /// Embedded participant record.
    Participant(Participant),
}

impl TeamMember {
    /// Name shown on the dashboard.
    pub fn display_name(&self) -> String {
        match self {
            TeamMember::Name(name) => name.trim().to_string(),
            TeamMember::Participant(participant) => participant.display_name(),
        }
    }
}

/// Team generated by the backend when the hackathon starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Team name, if the backend assigned one.
    #[serde(default)]
    pub name: Option<String>,
    /// Team members.
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<TeamMember>,
}

impl Team {
    /// Comma separated member names, or a placeholder for empty teams.
    pub fn members_display(&self) -> String {
        let names = self
            .participants
            .iter()
            .map(TeamMember::display_name)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();

        if names.is_empty() {
            "No participants".to_string()
        } else {
            names.join(", ")
        }
    }
}

/// HAL hyperlink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    /// Target URL.
    #[serde(default)]
    pub href: String,
}

/// Subset of HAL `_links` the client follows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Links {
    /// Canonical URL of the resource.
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
    /// Associated jury member.
    #[serde(rename = "juryMember", default)]
    pub jury_member: Option<Link>,
}

/// Hackathon idea, either from the catalog or proposed by a jury member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Subject {
    /// Identifier, when present in the body.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Idea title.
    #[serde(default)]
    pub title: String,
    /// Idea description.
    #[serde(default)]
    pub description: String,
    /// Problem the idea addresses.
    #[serde(default)]
    pub problem: String,
    /// What is new about the idea.
    #[serde(default)]
    pub innovation: String,
    /// HAL links.
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Subject {
    /// Identifier from the body, or recovered from the `/subjects/{id}` self link.
    pub fn subject_id(&self) -> Option<String> {
        self.id.clone().or_else(|| {
            self.links
                .self_link
                .as_ref()
                .and_then(|link| id_after_segment(&link.href, "subjects"))
                .map(|id| id.to_string())
        })
    }
}

/// Hackathon record created by team generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HackathonRecord {
    /// Backend identifier.
    #[serde(default)]
    pub id: Option<u64>,
    /// HAL links.
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl HackathonRecord {
    /// Identifier taken from the `/hackathons/{id}/juryMember` link, falling back to the body.
    pub fn hackathon_id(&self) -> Option<u64> {
        self.links
            .jury_member
            .as_ref()
            .and_then(|link| id_after_segment(&link.href, "hackathons"))
            .or(self.id)
    }
}

/// Response of `POST /hackathons/generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateResponse {
    /// Generated teams.
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<Team>,
}

/// Idea fields shared by subject submission and registration payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewSubject {
    /// Idea title.
    pub title: String,
    /// Idea description.
    pub description: String,
    /// Problem the idea addresses.
    pub problem: String,
    /// What is new about the idea.
    pub innovation: String,
}

impl NewSubject {
    /// Copy with every field trimmed.
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            problem: self.problem.trim().to_string(),
            innovation: self.innovation.trim().to_string(),
        }
    }
}

impl Validate for NewSubject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("problem", &self.problem),
            ("innovation", &self.innovation),
        ] {
            if let Err(e) = required_text(value, field) {
                errors.add(field, e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Subject attached to a registration: an existing catalog id or a fresh proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubjectChoice {
    /// Catalog subject id.
    Existing(String),
    /// New idea submitted with the registration.
    Proposed(NewSubject),
}

/// Body of `POST /participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Skill picked from the catalog.
    pub skill: String,
    /// Idea attached to the registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectChoice>,
}

/// Body of `POST /jury-members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJuryMember {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address.
    pub email: String,
    /// Idea attached to the registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectChoice>,
}

/// Numeric identifier that follows `segment` in a path or URL.
fn id_after_segment(href: &str, segment: &str) -> Option<u64> {
    let mut parts = href.split('/');
    parts.by_ref().find(|part| *part == segment)?;
    parts.next()?.parse().ok()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept identifiers sent either as JSON numbers or strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(id)) => Some(id.to_string()),
        Some(RawId::Text(id)) if !id.trim().is_empty() => Some(id),
        _ => None,
    })
}

/// ISO-8601 timestamps; values without an offset are read as UTC.
pub mod iso_datetime {
    use time::{
        OffsetDateTime, PrimitiveDateTime,
        format_description::well_known::{Iso8601, Rfc3339},
    };

    /// Parse an RFC 3339 timestamp, or an offset-less ISO-8601 one assumed to be UTC.
    pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).or_else(|_| {
            PrimitiveDateTime::parse(value, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
    }

    /// Serde adapter for `Option<OffsetDateTime>`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de, ser};
        use time::{OffsetDateTime, format_description::well_known::Rfc3339};

        /// Write `Some` as RFC 3339.
        pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => {
                    let formatted = value.format(&Rfc3339).map_err(ser::Error::custom)?;
                    serializer.serialize_some(&formatted)
                }
                None => serializer.serialize_none(),
            }
        }

        /// Read null, blank or ISO-8601 strings.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => super::parse(value).map(Some).map_err(de::Error::custom),
            }
        }
    }
}
