//! Registration payloads accepted by `POST /registrations`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::{
    dao::{
        backend::MailKind,
        models::{HackathonState, NewJuryMember, NewParticipant, NewSubject, SubjectChoice},
    },
    dto::{
        skill::known_skill,
        validation::{required_text, validate_email_confirmation},
    },
};

/// Who is registering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationRole {
    /// Competes in a team.
    Participant,
    /// Evaluates the projects.
    Jury,
}

/// What the registrant wants to do about the hackathon idea.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdeaOption {
    /// No idea attached.
    #[default]
    None,
    /// Back an existing catalog subject.
    Adopt,
    /// Propose a new subject.
    Propose,
}

/// Registration form submitted by a participant or jury member.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address, also the mail recipient.
    pub email: String,
    /// Must repeat `email` exactly.
    pub email_confirm: String,
    /// Whether this is a participant or a jury member.
    pub role: RegistrationRole,
    /// Required for participants, ignored for the jury.
    #[serde(default)]
    pub skill: Option<String>,
    /// What to do about a hackathon idea.
    #[serde(default)]
    pub has_idea: IdeaOption,
    /// Catalog subject id, required with `adopt`.
    #[serde(default)]
    pub selected_subject: Option<String>,
    /// New subject, required with `propose`.
    #[serde(default)]
    pub idea: Option<NewSubject>,
}

impl Validate for RegistrationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = required_text(&self.first_name, "first name") {
            errors.add("first_name", e);
        }
        if let Err(e) = required_text(&self.last_name, "last name") {
            errors.add("last_name", e);
        }
        if !self.email.trim().validate_email() {
            let mut err = ValidationError::new("email");
            err.message = Some("A valid email address is required".into());
            errors.add("email", err);
        } else if let Err(e) = validate_email_confirmation(&self.email, &self.email_confirm) {
            errors.add("email_confirm", e);
        }

        if self.role == RegistrationRole::Participant {
            let skill = self.skill.as_deref().unwrap_or_default();
            if let Err(e) = required_text(skill, "skill").and_then(|()| known_skill(skill)) {
                errors.add("skill", e);
            }
        }

        match self.has_idea {
            IdeaOption::None => {}
            IdeaOption::Adopt => {
                let subject = self.selected_subject.as_deref().unwrap_or_default();
                if let Err(e) = required_text(subject, "selected subject") {
                    errors.add("selected_subject", e);
                }
            }
            IdeaOption::Propose => match &self.idea {
                Some(idea) => {
                    if let Err(idea_errors) = idea.validate() {
                        errors.merge_self("idea", Err(idea_errors));
                    }
                }
                None => {
                    let mut err = ValidationError::new("required");
                    err.message = Some("A proposed idea needs its four fields".into());
                    errors.add("idea", err);
                }
            },
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Backend payload built from a validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Body of `POST /participants`.
    Participant(NewParticipant),
    /// Body of `POST /jury-members`.
    Jury(NewJuryMember),
}

impl Registration {
    /// Address the confirmation mail goes to.
    pub fn email(&self) -> &str {
        match self {
            Registration::Participant(participant) => &participant.email,
            Registration::Jury(jury_member) => &jury_member.email,
        }
    }

    /// Role the payload registers.
    pub fn role(&self) -> RegistrationRole {
        match self {
            Registration::Participant(_) => RegistrationRole::Participant,
            Registration::Jury(_) => RegistrationRole::Jury,
        }
    }
}

impl RegistrationRequest {
    /// Build the backend payload. Call [`Validate::validate`] first.
    pub fn into_registration(self) -> Registration {
        let subject = match self.has_idea {
            IdeaOption::None => None,
            IdeaOption::Adopt => self
                .selected_subject
                .map(|id| SubjectChoice::Existing(id.trim().to_string())),
            IdeaOption::Propose => self
                .idea
                .map(|idea| SubjectChoice::Proposed(idea.trimmed())),
        };
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = self.email.trim().to_string();

        match self.role {
            RegistrationRole::Participant => Registration::Participant(NewParticipant {
                first_name,
                last_name,
                email,
                skill: self.skill.unwrap_or_default().trim().to_string(),
                subject,
            }),
            RegistrationRole::Jury => Registration::Jury(NewJuryMember {
                first_name,
                last_name,
                email,
                subject,
            }),
        }
    }
}

/// Acknowledgement of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegistrationResponse {
    /// Whether this is a participant or a jury member.
    pub role: RegistrationRole,
    /// Contact address, also the mail recipient.
    pub email: String,
    /// State the registration was accepted in.
    pub state: HackathonState,
    /// Notification requested from the backend.
    pub mail: MailKind,
    /// `false` when the notification could not be sent.
    pub mail_sent: bool,
}
