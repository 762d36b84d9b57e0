//! `SqliteTrendingStore` - `TrendingApi` over the local database.

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use cinefind_api::trending::{TrendingApi, TrendingEntry, TrendingSeed};
use rusqlite::Connection;
use tracing::instrument;

use super::trending::{increment_search, load_trending};

/// Trending store backed by a local `SQLite` connection.
///
/// Cheap to clone; clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteTrendingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrendingStore {
    /// Wraps an opened (and migrated) connection.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` with the locked connection.
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("trending database lock poisoned"))?;
        f(&conn)
    }
}

impl TrendingApi for SqliteTrendingStore {
    #[instrument(skip_all)]
    async fn record_search(&self, term: &str, seed: &TrendingSeed) -> Result<()> {
        let count = self.with_conn(|conn| increment_search(conn, term, seed))?;
        tracing::debug!(term, count, "Trending count recorded");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>> {
        self.with_conn(|conn| load_trending(conn, limit))
    }
}
