//! Participant skill catalog offered by the registration form.

use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

/// One selectable skill. `value` is what the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkillInfo {
    /// Stored value.
    #[schema(value_type = String)]
    pub value: &'static str,
    /// Label shown on the form.
    #[schema(value_type = String)]
    pub title: &'static str,
    /// What the role brings to a team.
    #[schema(value_type = Vec<String>)]
    pub descriptions: &'static [&'static str],
}

/// Every skill a participant can register with.
pub const SKILLS: [SkillInfo; 4] = [
    SkillInfo {
        value: "Développeur",
        title: "Développeur",
        descriptions: &[
            "Fluent in languages such as Java, Python or JavaScript.",
            "Codes quickly and solves technical problems.",
        ],
    },
    SkillInfo {
        value: "Designer",
        title: "Designer",
        descriptions: &[
            "Builds intuitive and attractive interfaces.",
            "Shapes the user experience so the project is credible and usable.",
        ],
    },
    SkillInfo {
        value: "Chef de projet",
        title: "Chef de projet",
        descriptions: &[
            "Structures the idea and sets the vision and strategy.",
            "Keeps innovation and feasibility consistent.",
        ],
    },
    SkillInfo {
        value: "Communicant",
        title: "Communicant",
        descriptions: &[
            "Pitches the project to the jury.",
            "Tells the story that sells the solution.",
        ],
    },
];

/// Catalog entry for `value`, ignoring surrounding whitespace.
pub fn find_skill(value: &str) -> Option<&'static SkillInfo> {
    let value = value.trim();
    SKILLS.iter().find(|skill| skill.value == value)
}

/// Validates that `value` names a catalog skill.
pub fn known_skill(value: &str) -> Result<(), ValidationError> {
    if find_skill(value).is_none() {
        let mut err = ValidationError::new("unknown_skill");
        err.message = Some(format!("unknown skill `{}`", value.trim()).into());
        return Err(err);
    }
    Ok(())
}
