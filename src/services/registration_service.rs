use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::backend::MailKind,
    dto::registration::{Registration, RegistrationRequest, RegistrationResponse},
    error::ServiceError,
    state::SharedState,
};

/// Register a participant or jury member, then ask the backend to notify them.
///
/// Registrations are refused without any create call once the hackathon is
/// running or finished. A failed notification is logged and does not undo the
/// registration.
pub async fn register(
    state: &SharedState,
    request: RegistrationRequest,
) -> Result<RegistrationResponse, ServiceError> {
    request.validate()?;

    let current = state.status_service().current_state().await?;
    if !current.accepts_registrations() {
        return Err(ServiceError::InvalidState(format!(
            "registrations are closed while the hackathon is {current}"
        )));
    }

    let registration = request.into_registration();
    let role = registration.role();
    let email = registration.email().to_string();
    let api = state.api();
    match registration {
        Registration::Participant(participant) => api.create_participant(participant).await?,
        Registration::Jury(jury_member) => api.create_jury_member(jury_member).await?,
    }
    info!(?role, %current, "registration created");

    let mail = MailKind::for_state(current);
    let mail_sent = match api.send_mail(mail, email.clone()).await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, endpoint = mail.endpoint(), "failed to send registration mail");
            false
        }
    };

    Ok(RegistrationResponse {
        role,
        email,
        state: current,
        mail,
        mail_sent,
    })
}
