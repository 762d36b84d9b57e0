//! Trending store record types.

use serde::{Deserialize, Serialize};

use crate::tmdb::TmdbMovieSummary;

/// Number of entries shown in the trending strip.
pub const DEFAULT_TRENDING_LIMIT: u32 = 5;

/// Normalizes a search term into the store key (trimmed, lowercase).
#[must_use]
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// A stored search term with its popularity counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingEntry {
    /// Store-assigned record ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Normalized search term.
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    /// TMDB ID of the movie the term first resolved to.
    pub tmdb_id: u64,
    /// Display title.
    pub title: String,
    /// Poster image URL.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Number of recorded searches.
    pub count: u64,
}

/// Movie identity used to seed a new trending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingSeed {
    /// TMDB movie ID.
    pub tmdb_id: u64,
    /// Display title.
    pub title: String,
    /// Poster image URL.
    pub poster_url: Option<String>,
}

impl From<&TmdbMovieSummary> for TrendingSeed {
    fn from(movie: &TmdbMovieSummary) -> Self {
        Self {
            tmdb_id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(),
        }
    }
}
