//! Error types of the reqwest-based backend client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::error::ApiError;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the REST backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build backend HTTP client")]
    ClientBuilder {
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid backend base URL `{url}`")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
    },
    /// A request could not be sent or timed out.
    #[error("failed to send backend request to `{path}`")]
    RequestSend {
        /// Backend path of the request.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The backend returned an unexpected status code.
    #[error("unexpected backend response status {status} for `{path}`")]
    RequestStatus {
        /// Backend path of the request.
        path: String,
        /// Status the backend answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode backend response for `{path}`")]
    DecodeResponse {
        /// Backend path of the request.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// Decoding a JSON value into the expected model failed.
    #[error("failed to deserialize backend value for `{path}`")]
    DeserializeValue {
        /// Backend path of the request.
        path: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<RestDaoError> for ApiError {
    fn from(err: RestDaoError) -> Self {
        match err {
            RestDaoError::RequestStatus { path, status } => {
                ApiError::rejected(path, status.as_u16())
            }
            other => ApiError::unavailable(other.to_string(), other),
        }
    }
}
