pub mod dashboard;
/// Health check response.
pub mod health;
pub mod registration;
pub mod skill;
/// Server-sent event framing.
pub mod sse;
/// Subject catalog entries.
pub mod subject;
pub mod validation;
