use std::time::Duration;

/// Runtime configuration describing how to reach the hackathon REST backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// API root, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Option<Duration>,
}

impl RestConfig {
    /// Construct a configuration from the API base URL (for example `http://host/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
