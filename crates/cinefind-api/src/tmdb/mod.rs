//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints
//! and retrieves movie listings, search results, and details.

mod api;
mod client;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    DEFAULT_FAILURE_MESSAGE, DiscoverMovieParams, POSTER_BASE_URL, SearchMovieParams,
    TmdbApiFailure, TmdbCastMember, TmdbCredits, TmdbCrewMember, TmdbGenre, TmdbMovieDetails,
    TmdbMoviePage, TmdbMovieSummary, TmdbVideo, TmdbVideos, poster_url,
};
pub use util::list_movies;
