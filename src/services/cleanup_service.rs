use thiserror::Error;
use tracing::info;

use crate::dao::{
    backend::{BulkCollection, HackathonApi},
    error::ApiError,
};

/// A bulk delete failed; later collections were left untouched.
#[derive(Debug, Error)]
#[error("failed to delete {collection}")]
pub struct CleanupError {
    /// Collection whose delete failed.
    pub collection: BulkCollection,
    /// Backend failure.
    #[source]
    pub source: ApiError,
}

/// Wipe every collection of the finished cycle, strictly in [`BulkCollection::CLEANUP_ORDER`].
///
/// Each delete is awaited before the next one starts. The first failure stops
/// the sequence; nothing already deleted is restored.
pub async fn delete_all_hackathon_data(api: &dyn HackathonApi) -> Result<(), CleanupError> {
    for collection in BulkCollection::CLEANUP_ORDER {
        api.delete_all(collection)
            .await
            .map_err(|source| CleanupError { collection, source })?;
        info!(%collection, "collection deleted");
    }
    Ok(())
}
