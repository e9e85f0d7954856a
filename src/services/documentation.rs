use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the hackathon lifecycle service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::dashboard::get_dashboard,
        crate::routes::dashboard::get_countdown,
        crate::routes::sse::countdown_stream,
        crate::routes::sse::dashboard_stream,
        crate::routes::registration::create_registration,
        crate::routes::skills::list_skills,
        crate::routes::subjects::list_subjects,
        crate::routes::subjects::submit_subject,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::dashboard::DashboardView,
            crate::dto::dashboard::DashboardSnapshot,
            crate::dto::dashboard::TeamSummary,
            crate::dto::dashboard::FormattedPeriod,
            crate::dto::subject::SubjectSummary,
            crate::dto::registration::RegistrationRequest,
            crate::dto::registration::RegistrationResponse,
            crate::dto::registration::RegistrationRole,
            crate::dto::registration::IdeaOption,
            crate::dto::skill::SkillInfo,
            crate::state::countdown::Countdown,
            crate::dao::models::HackathonState,
            crate::dao::models::Period,
            crate::dao::models::NewSubject,
            crate::dao::backend::MailKind,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Lifecycle dashboard and countdown"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "registration", description = "Participant and jury registration"),
        (name = "subjects", description = "Subject catalog"),
        (name = "skills", description = "Participant skill catalog"),
    )
)]
/// OpenAPI document of every route.
pub struct ApiDoc;
