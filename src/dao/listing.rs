//! Normalization of the list shapes returned by the backend.
//!
//! Collections come back as a bare array, as a HAL document
//! (`{"_embedded": {"<entity>": [...]}}`) or as a page (`{"content": [...]}`).

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Flatten any supported list shape into typed entities.
///
/// `null`, unknown shapes and objects missing the expected key yield an empty list.
/// Items that do not match `T` are skipped.
pub fn extract_entities<T>(body: Option<Value>, embedded_key: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = match body {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => {
            let embedded = map
                .remove("_embedded")
                .and_then(|mut embedded| embedded.get_mut(embedded_key).map(Value::take));
            match embedded.or_else(|| map.remove("content")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entity) => Some(entity),
            Err(err) => {
                warn!(entity = embedded_key, error = %err, "skipping malformed list item");
                None
            }
        })
        .collect()
}
