//! `TrendingApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{TrendingEntry, TrendingSeed};

/// Trending store trait.
///
/// Implemented by the hosted Appwrite client and the local `SQLite` store.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TrendingApi: Send)]
pub trait LocalTrendingApi {
    /// Records a search for `term`.
    ///
    /// Increments the counter of the record keyed by the normalized term,
    /// or creates it seeded from `seed` with a count of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    async fn record_search(&self, term: &str, seed: &TrendingSeed) -> Result<()>;

    /// Lists up to `limit` entries ordered by count descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn list_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>>;
}
