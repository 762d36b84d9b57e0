//! Trending store selected from config.

use anyhow::Result;
use cinefind_api::trending::{AppwriteClient, TrendingApi, TrendingEntry, TrendingSeed};
use cinefind_db::SqliteTrendingStore;

/// Configured trending store backend.
#[derive(Debug)]
pub enum TrendingBackend {
    /// Hosted Appwrite collection.
    Appwrite(AppwriteClient),
    /// Local `SQLite` database.
    Sqlite(SqliteTrendingStore),
}

impl TrendingBackend {
    /// Short backend name for log output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Appwrite(_) => "appwrite",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl TrendingApi for TrendingBackend {
    async fn record_search(&self, term: &str, seed: &TrendingSeed) -> Result<()> {
        match self {
            Self::Appwrite(client) => client.record_search(term, seed).await,
            Self::Sqlite(store) => store.record_search(term, seed).await,
        }
    }

    async fn list_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>> {
        match self {
            Self::Appwrite(client) => client.list_trending(limit).await,
            Self::Sqlite(store) => store.list_trending(limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn seed(id: u64, title: &str) -> TrendingSeed {
        TrendingSeed {
            tmdb_id: id,
            title: String::from(title),
            poster_url: None,
        }
    }

    #[tokio::test]
    async fn test_sqlite_backend_delegates() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let conn = cinefind_db::open_db(Some(&dir.path().to_path_buf())).unwrap();
        let backend = TrendingBackend::Sqlite(SqliteTrendingStore::new(conn));

        // Act
        backend
            .record_search("Dune", &seed(438_631, "Dune"))
            .await
            .unwrap();
        backend
            .record_search(" dune ", &seed(438_631, "Dune"))
            .await
            .unwrap();
        let entries = backend.list_trending(5).await.unwrap();

        // Assert
        assert_eq!(backend.name(), "sqlite");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].search_term, "dune");
        assert_eq!(entries[0].count, 2);
    }
}
