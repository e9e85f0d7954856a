use std::error::Error;
use thiserror::Error;

/// Result alias for backend operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error raised by backend clients regardless of the underlying transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend could not be reached or its answer was unreadable.
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// Human readable summary.
        message: String,
        /// Transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered with a non-success status.
    #[error("backend rejected `{path}` with status {status}")]
    Rejected {
        /// Backend path of the request.
        path: String,
        /// HTTP status code.
        status: u16,
    },
}

impl ApiError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        ApiError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an error for a response carrying a non-success status code.
    pub fn rejected(path: impl Into<String>, status: u16) -> Self {
        ApiError::Rejected {
            path: path.into(),
            status,
        }
    }

    /// Whether the backend answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Rejected { status: 404, .. })
    }
}
