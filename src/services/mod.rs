/// Deletion of per-edition backend data.
pub mod cleanup_service;
/// Lifecycle orchestrator driving the dashboard and countdown.
pub mod dashboard_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Participant and jury registration.
pub mod registration_service;
/// Server-Sent Events streaming of countdown and dashboard changes.
pub mod sse_service;
/// Status record access.
pub mod status_service;
/// Subject catalog listing and submission.
pub mod subject_service;
/// Lifecycle state transitions and their side effects.
pub mod transition_service;
