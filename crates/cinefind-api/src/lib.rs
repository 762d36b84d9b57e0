//! API client library for cinefind.
//!
//! Provides clients for the TMDB metadata API and the trending search
//! counter store.

mod rate_limiter;

/// TMDB API client.
pub mod tmdb;

/// Trending search store client.
pub mod trending;
