//! Library crate for hackathon-lifecycle, exposing modules for binaries and integration tests.

pub mod config;
/// Backend access: wire models, the `HackathonApi` seam and its REST client.
pub mod dao;
/// Payloads exposed over HTTP and SSE.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// axum route trees.
pub mod routes;
/// Domain services and the lifecycle orchestrator.
pub mod services;
/// Shared application state.
pub mod state;
pub mod time_utils;
