//! Helpers composed on top of `TrendingApi`.

use tracing::instrument;

use super::api::TrendingApi;
use super::types::TrendingEntry;

/// Lists trending entries, degrading to an empty list on any error.
///
/// Trending is a non-essential enhancement: failures are logged and never
/// propagated to the caller.
#[instrument(skip(api))]
pub async fn load_trending_or_empty(
    api: &(impl TrendingApi + Sync),
    limit: u32,
) -> Vec<TrendingEntry> {
    match api.list_trending(limit).await {
        Ok(entries) => {
            tracing::debug!(count = entries.len(), "Trending entries loaded");
            entries
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Failed to load trending entries");
            Vec::new()
        }
    }
}
