//! Local trending store.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep per-term search counters
//! when no hosted trending store is configured.

mod connection;
mod migrations;
/// `TrendingApi` implementation over a shared connection.
pub mod store;
/// Trending counter CRUD operations.
pub mod trending;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, resolve_data_dir, resolve_db_path};
pub use store::SqliteTrendingStore;
pub use trending::{increment_search, load_trending};
