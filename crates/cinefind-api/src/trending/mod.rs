//! Trending search store module.
//!
//! Records how often each search term led to a result and lists the most
//! searched terms. The hosted implementation talks to the Appwrite
//! Databases REST API; other stores implement the same trait.

mod api;
mod appwrite;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTrendingApi, TrendingApi};
pub use appwrite::{AppwriteClient, AppwriteClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{DEFAULT_TRENDING_LIMIT, TrendingEntry, TrendingSeed, normalize_term};
pub use util::load_trending_or_empty;
