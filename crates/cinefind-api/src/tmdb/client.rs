//! `TmdbClient` - TMDB API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::TmdbApi;
use super::types::{
    DiscoverMovieParams, SearchMovieParams, TmdbApiFailure, TmdbErrorResponse, TmdbFailureFlag,
    TmdbMovieDetails, TmdbMoviePage,
};
use crate::rate_limiter::RateLimiter;

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Maximum number of retries for HTTP 429 responses.
const MAX_RETRIES: u32 = 3;

/// Backoff duration between retries.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Default minimum interval between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 25ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_token = self.api_token.context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let rate_limiter = RateLimiter::new(self.min_interval.unwrap_or(DEFAULT_MIN_INTERVAL));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Sends a GET request with Bearer auth, query params, and rate limiting.
    /// Retries up to `MAX_RETRIES` times on HTTP 429.
    ///
    /// A 2xx body flagged as failed by the API is returned as `TmdbApiFailure`.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut retries = 0u32;
        loop {
            let request = self
                .http_client
                .get(url.clone())
                .bearer_auth(&self.api_token)
                .query(query)
                .build()
                .with_context(|| format!("failed to build request: {path}"))?;

            tracing::debug!(url = %request.url(), "TMDB API request");

            let result = self.http_client.execute(request).await;
            let response = result.with_context(|| format!("request failed: {path}"))?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                retries = retries.saturating_add(1);
                if retries > MAX_RETRIES {
                    bail!("TMDB API rate limit exceeded after {MAX_RETRIES} retries: {path}");
                }
                tracing::warn!(
                    retry = retries,
                    max_retries = MAX_RETRIES,
                    "TMDB API rate limited (429). Retrying..."
                );
                tokio::time::sleep(RETRY_BACKOFF.saturating_mul(retries)).await;
                self.rate_limiter.lock().await.wait().await;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<failed to read body>"));
                if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                    bail!(
                        "TMDB API error (HTTP {}): code={}, message={}",
                        status,
                        error_response.status_code,
                        error_response.status_message,
                    );
                }
                bail!("TMDB API error (HTTP {status}): {body}");
            }

            let body = response
                .text()
                .await
                .with_context(|| format!("failed to read response body: {path}"))?;

            if let Ok(flag) = serde_json::from_str::<TmdbFailureFlag>(&body)
                && let Some(message) = flag.failure_message()
            {
                tracing::warn!(%message, "TMDB API flagged response as failed");
                return Err(TmdbApiFailure { message }.into());
            }

            let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
            let parsed =
                raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
            return Ok(parsed);
        }
    }
}

impl TmdbApi for TmdbClient {
    #[instrument(skip_all)]
    async fn discover_movies(&self, params: &DiscoverMovieParams) -> Result<TmdbMoviePage> {
        let query: Vec<(&str, String)> = vec![
            ("sort_by", params.sort_by.clone()),
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
            ("include_adult", params.include_adult.to_string()),
        ];

        self.get_json("discover/movie", &query).await
    }

    #[instrument(skip_all)]
    async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMoviePage> {
        let mut query: Vec<(&str, String)> = vec![
            ("query", params.query.clone()),
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
            ("include_adult", params.include_adult.to_string()),
        ];
        if let Some(year) = params.year {
            query.push(("year", year.to_string()));
        }

        self.get_json("search/movie", &query).await
    }

    #[instrument(skip_all)]
    async fn movie_details(&self, movie_id: u64, language: &str) -> Result<TmdbMovieDetails> {
        let path = format!("movie/{movie_id}");
        let query = [
            ("append_to_response", String::from("videos,credits")),
            ("language", String::from(language)),
        ];
        self.get_json(&path, &query).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::tmdb::list_movies;

    fn test_client(mock_server: &wiremock::MockServer, token: &str) -> TmdbClient {
        let base_url = format!("{}/3/", mock_server.uri());
        TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_token(token)
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("api_token is required")
        );
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = TmdbClient::builder().api_token("test-token").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_with_custom_base_url() {
        // Arrange
        let custom_url = Url::parse("http://localhost:8080/3/").unwrap();

        // Act
        let client = TmdbClient::builder()
            .base_url(custom_url.clone())
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url, custom_url);
    }

    #[test]
    fn test_parse_discover_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/discover_movie_popular.json");

        // Act
        let page: TmdbMoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.results.len(), 3);
        assert!(page.results[0].popularity >= page.results[1].popularity);
    }

    #[test]
    fn test_parse_movie_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_27205.json");

        // Act
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(details.id, 27_205);
        assert_eq!(details.title, "Inception");
        assert_eq!(details.runtime, Some(148));
        assert!(!details.credits.cast.is_empty());
        assert!(details.trailer().is_some());
    }

    #[tokio::test]
    async fn test_discover_movies_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/discover_movie_popular.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/movie"))
            .and(wiremock::matchers::query_param("sort_by", "popularity.desc"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");

        // Act
        let page = client
            .discover_movies(&DiscoverMovieParams::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(page.results.len(), 3);
    }

    #[tokio::test]
    async fn test_search_movie_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/search_movie_batman.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/search/movie"))
            .and(wiremock::matchers::query_param("query", "the batman"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");
        let params = SearchMovieParams::new("the batman");

        // Act
        let page = client.search_movie(&params).await.unwrap();

        // Assert
        assert!(!page.results.is_empty());
        assert_eq!(page.results[0].title, "The Batman");
    }

    #[tokio::test]
    async fn test_search_movie_sends_only_year_filter() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/search_movie_batman.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/search/movie"))
            .and(wiremock::matchers::query_param("year", "2022"))
            .and(wiremock::matchers::query_param_is_missing("primary_release_year"))
            .and(wiremock::matchers::query_param_is_missing("region"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");
        let params = SearchMovieParams::new("the batman").year(2022);

        // Act
        let page = client.search_movie(&params).await.unwrap();

        // Assert
        assert_eq!(page.results[0].title, "The Batman");
    }

    #[tokio::test]
    async fn test_movie_details_appends_videos_and_credits() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_details_27205.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/movie/27205"))
            .and(wiremock::matchers::query_param(
                "append_to_response",
                "videos,credits",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");

        // Act
        let details = client.movie_details(27_205, "en-US").await.unwrap();

        // Assert
        assert_eq!(details.id, 27_205);
        assert_eq!(details.directors(), vec!["Christopher Nolan"]);
    }

    #[tokio::test]
    async fn test_empty_query_never_hits_search_endpoint() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/discover_movie_popular.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/movie"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/search/movie"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");

        // Act
        let page = list_movies(&client, "", "en-US").await.unwrap();

        // Assert
        assert_eq!(page.results.len(), 3);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/search_movie_empty.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header(
                "Authorization",
                "Bearer my-secret-token",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "my-secret-token");
        let params = SearchMovieParams::new("test");

        // Act & Assert (mock expect(1) verifies Authorization header)
        client.search_movie(&params).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_returns_tmdb_error() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let error_body = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(401).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "invalid-token");

        // Act
        let result = client.discover_movies(&DiscoverMovieParams::default()).await;

        // Assert
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<TmdbApiFailure>().is_none());
        let err = err.to_string();
        assert!(err.contains("TMDB API error"));
        assert!(err.contains("Invalid API key"));
    }

    #[tokio::test]
    async fn test_flagged_2xx_body_returns_api_failure() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let body = r#"{"Response":"False","Error":"Invalid API key"}"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/movie"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");

        // Act
        let err = client
            .discover_movies(&DiscoverMovieParams::default())
            .await
            .unwrap_err();

        // Assert
        let failure = err.downcast_ref::<TmdbApiFailure>().unwrap();
        assert_eq!(failure.message, "Invalid API key");
    }

    #[tokio::test]
    async fn test_http_429_retries() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let error_body = r#"{"status_code":25,"status_message":"Your request count is over the allowed limit.","success":false}"#;

        // Return 429 for all requests: initial + MAX_RETRIES
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429).set_body_string(error_body))
            .expect(u64::from(MAX_RETRIES) + 1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server, "test-token");
        let params = SearchMovieParams::new("test");

        // Act
        let result = client.search_movie(&params).await;

        // Assert
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("rate limit"));
    }

    #[tokio::test]
    async fn test_rate_limiter_enforces_interval() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/search_movie_empty.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(2)
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(100))
            .build()
            .unwrap();

        let params = SearchMovieParams::new("test");

        // Act
        let start = std::time::Instant::now();
        client.search_movie(&params).await.unwrap();
        client.search_movie(&params).await.unwrap();
        let elapsed = start.elapsed();

        // Assert: at least 100ms interval between two requests
        assert!(elapsed >= Duration::from_millis(100));
    }
}
