use tracing::info;
use validator::Validate;

use crate::{
    dao::models::NewSubject, dto::subject::SubjectSummary, error::ServiceError,
    state::SharedState,
};

/// Subject catalog with ids recovered from self links.
pub async fn list_subjects(state: &SharedState) -> Result<Vec<SubjectSummary>, ServiceError> {
    let subjects = state.api().list_subjects().await?;
    Ok(subjects.iter().map(SubjectSummary::catalog_entry).collect())
}

/// Submit a new idea to the catalog.
pub async fn submit_subject(
    state: &SharedState,
    subject: NewSubject,
) -> Result<SubjectSummary, ServiceError> {
    subject.validate()?;
    let created = state.api().create_subject(subject.trimmed()).await?;
    info!(id = ?created.subject_id(), "subject submitted");
    Ok(SubjectSummary::from(&created))
}
