mod client;
mod config;
mod error;

pub use client::RestHackathonApi;
pub use config::RestConfig;
pub use error::{RestDaoError, RestResult};
