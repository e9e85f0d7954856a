use axum::Router;

use crate::state::SharedState;

/// Dashboard and countdown snapshots.
pub mod dashboard;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Participant and jury registration.
pub mod registration;
/// Skill catalog.
pub mod skills;
/// Server-sent event streams.
pub mod sse;
/// Subject catalog.
pub mod subjects;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(dashboard::router())
        .merge(sse::router())
        .merge(registration::router())
        .merge(skills::router())
        .merge(subjects::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
