//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{DiscoverMovieParams, SearchMovieParams, TmdbMovieDetails, TmdbMoviePage};

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Lists movies from `discover/movie` (popularity descending by default).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the body is flagged as
    /// failed (`TmdbApiFailure`), or JSON parsing fails.
    async fn discover_movies(&self, params: &DiscoverMovieParams) -> Result<TmdbMoviePage>;

    /// Searches for movies by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the body is flagged as
    /// failed (`TmdbApiFailure`), or JSON parsing fails.
    async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMoviePage>;

    /// Fetches movie details with `videos` and `credits` appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_details(&self, movie_id: u64, language: &str) -> Result<TmdbMovieDetails>;
}
