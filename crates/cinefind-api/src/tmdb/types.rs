//! TMDB API response types and request parameters.

use serde::Deserialize;

/// Base URL for poster images (w500 rendition).
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Fallback message when the API flags a failure without a message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to fetch movies";

/// Builds the full poster image URL from a TMDB `poster_path`.
///
/// Accepts paths with or without the leading slash.
#[must_use]
pub fn poster_url(poster_path: &str) -> String {
    format!("{POSTER_BASE_URL}/{}", poster_path.trim_start_matches('/'))
}

// --- Movie lists (discover / search) ---

/// Response page from `discover/movie` and `search/movie`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMoviePage {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page.
    #[serde(default)]
    pub results: Vec<TmdbMovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A single movie as returned in list responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbMovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: String,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Release date (YYYY-MM-DD, empty or null when unknown).
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl TmdbMovieSummary {
    /// Release year extracted from `release_date`.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        release_year(self.release_date.as_deref())
    }

    /// Full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(poster_url)
    }
}

/// Returns the `YYYY` prefix of a TMDB date string.
fn release_year(date: Option<&str>) -> Option<&str> {
    date.and_then(|d| d.get(..4)).filter(|y| !y.is_empty())
}

// --- Movie details ---

/// Response from `movie/{id}?append_to_response=videos,credits`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbMovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: String,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Release date.
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Release status (e.g., "Released").
    pub status: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
    /// Appended credits sub-resource.
    #[serde(default)]
    pub credits: TmdbCredits,
    /// Appended videos sub-resource.
    #[serde(default)]
    pub videos: TmdbVideos,
}

impl TmdbMovieDetails {
    /// Release year extracted from `release_date`.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        release_year(self.release_date.as_deref())
    }

    /// Full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(poster_url)
    }

    /// Cast members in billing order, at most `limit` of them.
    #[must_use]
    pub fn top_cast(&self, limit: usize) -> Vec<&TmdbCastMember> {
        let mut cast: Vec<&TmdbCastMember> = self.credits.cast.iter().collect();
        cast.sort_by_key(|c| c.order);
        cast.truncate(limit);
        cast
    }

    /// Names of crew members credited as "Director".
    #[must_use]
    pub fn directors(&self) -> Vec<&str> {
        self.credits
            .crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Preferred trailer: an official YouTube trailer, else any YouTube trailer.
    #[must_use]
    pub fn trailer(&self) -> Option<&TmdbVideo> {
        let trailers = || {
            self.videos
                .results
                .iter()
                .filter(|v| v.kind == "Trailer" && v.watch_url().is_some())
        };
        trailers().find(|v| v.official).or_else(|| trailers().next())
    }
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// Credits sub-resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TmdbCredits {
    /// Cast list.
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    /// Crew list.
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

/// A cast member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbCastMember {
    /// TMDB person ID.
    pub id: u64,
    /// Person name.
    pub name: String,
    /// Character played.
    pub character: Option<String>,
    /// Billing order.
    #[serde(default)]
    pub order: u32,
}

/// A crew member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbCrewMember {
    /// TMDB person ID.
    pub id: u64,
    /// Person name.
    pub name: String,
    /// Job title (e.g., "Director").
    #[serde(default)]
    pub job: String,
    /// Department (e.g., "Directing").
    #[serde(default)]
    pub department: String,
}

/// Videos sub-resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TmdbVideos {
    /// Video list.
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// A video attached to a movie (trailer, teaser, clip, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TmdbVideo {
    /// Site-specific video key.
    pub key: String,
    /// Video name.
    pub name: String,
    /// Hosting site (e.g., "YouTube").
    pub site: String,
    /// Video type (e.g., "Trailer").
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the video is official.
    #[serde(default)]
    pub official: bool,
}

impl TmdbVideo {
    /// Watch URL for supported hosting sites.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

// --- Error Response ---

/// TMDB API error response body (non-2xx).
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

/// API-level failure flags that may appear in a 2xx body.
///
/// Covers both the TMDB shape (`success: false` + `status_message`) and the
/// `Response: "False"` + `Error` shape returned by some proxies.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TmdbFailureFlag {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    success: Option<bool>,
    status_message: Option<String>,
}

impl TmdbFailureFlag {
    /// Returns the failure message if the payload is flagged as failed.
    pub(crate) fn failure_message(&self) -> Option<String> {
        let flagged_response = self
            .response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("false"));
        let flagged_success = self.success == Some(false);
        if !flagged_response && !flagged_success {
            return None;
        }
        let message = self
            .error
            .clone()
            .or_else(|| self.status_message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_FAILURE_MESSAGE));
        Some(message)
    }
}

/// A well-formed response that the API flagged as failed.
///
/// Recover it from an `anyhow::Error` with `downcast_ref` to show the
/// API's own message to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TmdbApiFailure {
    /// Message supplied by the API (or the generic fallback).
    pub message: String,
}

// --- Request Parameters ---

/// Parameters for `search/movie` endpoint.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Filter by year.
    pub year: Option<u32>,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            year: None,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Parameters for `discover/movie` endpoint.
#[derive(Debug, Clone)]
pub struct DiscoverMovieParams {
    /// Sort order (default: "popularity.desc").
    pub sort_by: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl Default for DiscoverMovieParams {
    fn default() -> Self {
        Self {
            sort_by: String::from("popularity.desc"),
            language: String::from("en-US"),
            page: 1,
            include_adult: false,
        }
    }
}

impl DiscoverMovieParams {
    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_poster_url_strips_leading_slash() {
        // Arrange & Act
        let with_slash = poster_url("/abc.jpg");
        let without_slash = poster_url("abc.jpg");

        // Assert
        assert_eq!(with_slash, "https://image.tmdb.org/t/p/w500/abc.jpg");
        assert_eq!(with_slash, without_slash);
    }

    #[test]
    fn test_failure_flag_response_false() {
        // Arrange
        let json = r#"{"Response":"False","Error":"Invalid API key"}"#;

        // Act
        let flag: TmdbFailureFlag = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(flag.failure_message().as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn test_failure_flag_success_false_without_message_uses_fallback() {
        // Arrange
        let json = r#"{"success":false}"#;

        // Act
        let flag: TmdbFailureFlag = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(
            flag.failure_message().as_deref(),
            Some(DEFAULT_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn test_failure_flag_absent_on_normal_page() {
        // Arrange
        let json = r#"{"page":1,"results":[],"total_pages":0,"total_results":0}"#;

        // Act
        let flag: TmdbFailureFlag = serde_json::from_str(json).unwrap();

        // Assert
        assert!(flag.failure_message().is_none());
    }

    #[test]
    fn test_summary_release_year() {
        // Arrange
        let json = r#"{"id":27205,"title":"Inception","release_date":"2010-07-15","poster_path":null,"backdrop_path":null,"overview":null}"#;

        // Act
        let movie: TmdbMovieSummary = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(movie.release_year(), Some("2010"));
        assert!(movie.poster_url().is_none());
    }

    #[test]
    fn test_summary_empty_release_date_has_no_year() {
        // Arrange
        let json = r#"{"id":1,"title":"Unknown","release_date":"","poster_path":null,"backdrop_path":null,"overview":null}"#;

        // Act
        let movie: TmdbMovieSummary = serde_json::from_str(json).unwrap();

        // Assert
        assert!(movie.release_year().is_none());
    }

    #[test]
    fn test_details_helpers() {
        // Arrange
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "overview": "A thief who steals corporate secrets...",
            "tagline": null,
            "runtime": 148,
            "status": "Released",
            "poster_path": "/poster.jpg",
            "backdrop_path": null,
            "credits": {
                "cast": [
                    {"id": 2, "name": "Joseph Gordon-Levitt", "character": "Arthur", "order": 1},
                    {"id": 1, "name": "Leonardo DiCaprio", "character": "Cobb", "order": 0}
                ],
                "crew": [
                    {"id": 3, "name": "Christopher Nolan", "job": "Director", "department": "Directing"},
                    {"id": 4, "name": "Hans Zimmer", "job": "Original Music Composer", "department": "Sound"}
                ]
            },
            "videos": {
                "results": [
                    {"key": "teaser", "name": "Teaser", "site": "YouTube", "type": "Teaser", "official": true},
                    {"key": "fan", "name": "Fan Trailer", "site": "YouTube", "type": "Trailer", "official": false},
                    {"key": "YoHD9XEInc0", "name": "Official Trailer", "site": "YouTube", "type": "Trailer", "official": true}
                ]
            }
        }"#;

        // Act
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        let cast = details.top_cast(1);
        assert_eq!(cast.len(), 1);
        assert_eq!(cast[0].name, "Leonardo DiCaprio");
        assert_eq!(details.directors(), vec!["Christopher Nolan"]);
        let trailer = details.trailer().unwrap();
        assert_eq!(
            trailer.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=YoHD9XEInc0")
        );
        assert_eq!(
            details.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
    }

    #[test]
    fn test_details_without_appended_resources() {
        // Arrange
        let json = r#"{"id":1,"title":"Bare","release_date":null,"overview":null,"tagline":null,"runtime":null,"status":null,"poster_path":null,"backdrop_path":null}"#;

        // Act
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert!(details.credits.cast.is_empty());
        assert!(details.trailer().is_none());
    }

    #[test]
    fn test_discover_params_default_sort() {
        // Arrange & Act
        let params = DiscoverMovieParams::default().language("ja-JP").page(2);

        // Assert
        assert_eq!(params.sort_by, "popularity.desc");
        assert_eq!(params.language, "ja-JP");
        assert_eq!(params.page, 2);
    }
}
