//! Helpers composed on top of `TmdbApi`.

use anyhow::Result;
use tracing::instrument;

use super::api::TmdbApi;
use super::types::{DiscoverMovieParams, SearchMovieParams, TmdbMoviePage};

/// Lists movies for a search box value.
///
/// A blank query lists popular movies via `discover/movie`; anything else
/// goes to `search/movie` with the trimmed query. The branch is explicit so
/// the search endpoint is never called with an empty query.
///
/// # Errors
///
/// Propagates the error of the underlying API call.
#[instrument(skip(api))]
pub async fn list_movies(
    api: &(impl TmdbApi + Sync),
    query: &str,
    language: &str,
) -> Result<TmdbMoviePage> {
    let query = query.trim();
    if query.is_empty() {
        let params = DiscoverMovieParams::default().language(language);
        api.discover_movies(&params).await
    } else {
        let params = SearchMovieParams::new(query).language(language);
        api.search_movie(&params).await
    }
}
