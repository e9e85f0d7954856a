/// Backend abstraction and its REST implementation.
pub mod backend;
/// Error shared by every backend implementation.
pub mod error;
/// Normalization of list responses.
pub mod listing;
/// Wire models of the hackathon backend.
pub mod models;
