use serde::Serialize;

/// Name of the event carrying countdown ticks.
pub const COUNTDOWN_EVENT: &str = "countdown";
/// Name of the event carrying dashboard snapshots.
pub const DASHBOARD_EVENT: &str = "dashboard";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: &'static str,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<T>(event: &'static str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            event,
            data: serde_json::to_string(payload)?,
        })
    }
}
