use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::Subject;

/// Title shown for catalog entries stored without one.
pub const UNTITLED_SUBJECT: &str = "Untitled";

/// Subject as exposed by the catalog and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubjectSummary {
    /// Catalog identifier; recovered from the self link when the body has none.
    pub id: Option<String>,
    /// Short name.
    pub title: String,
    /// What the project is.
    pub description: String,
    /// Problem it addresses.
    pub problem: String,
    /// What is new about it.
    pub innovation: String,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.subject_id(),
            title: subject.title.clone(),
            description: subject.description.clone(),
            problem: subject.problem.clone(),
            innovation: subject.innovation.clone(),
        }
    }
}

impl SubjectSummary {
    /// Catalog entry with a placeholder title when the stored one is blank.
    pub fn catalog_entry(subject: &Subject) -> Self {
        let mut summary = Self::from(subject);
        if summary.title.trim().is_empty() {
            summary.title = UNTITLED_SUBJECT.to_string();
        }
        summary
    }
}
