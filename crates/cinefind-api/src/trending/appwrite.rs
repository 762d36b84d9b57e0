//! `AppwriteClient` - trending store backed by the Appwrite Databases API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::TrendingApi;
use super::types::{TrendingEntry, TrendingSeed, normalize_term};
use crate::rate_limiter::RateLimiter;

/// Default Appwrite Cloud endpoint.
const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1/";

/// Default minimum interval between requests.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Document list response.
#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<TrendingEntry>,
}

/// Appwrite error response body.
#[derive(Debug, Deserialize)]
struct AppwriteErrorResponse {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Trending store client for an Appwrite collection.
#[derive(Debug)]
pub struct AppwriteClient {
    /// HTTP client.
    http_client: Client,
    /// `documents` collection URL.
    documents_url: Url,
    /// Appwrite project ID.
    project_id: String,
    /// Server API key (optional for collections with public permissions).
    api_key: Option<String>,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

/// Builder for `AppwriteClient`.
#[derive(Debug)]
pub struct AppwriteClientBuilder {
    endpoint: Option<Url>,
    project_id: Option<String>,
    database_id: Option<String>,
    collection_id: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
}

impl AppwriteClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            endpoint: None,
            project_id: None,
            database_id: None,
            collection_id: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
        }
    }

    /// Overrides the API endpoint (default: Appwrite Cloud).
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Sets the project ID (required).
    #[must_use]
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Sets the database ID (required).
    #[must_use]
    pub fn database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    /// Sets the collection ID (required).
    #[must_use]
    pub fn collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }

    /// Sets the server API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 50ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `project_id`, `database_id`, `collection_id` or `user_agent` is not set.
    /// - The documents URL cannot be built.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<AppwriteClient> {
        let project_id = self.project_id.context("project_id is required")?;
        let database_id = self.database_id.context("database_id is required")?;
        let collection_id = self.collection_id.context("collection_id is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let mut endpoint = if let Some(url) = self.endpoint {
            url
        } else {
            Url::parse(DEFAULT_ENDPOINT).context("invalid default endpoint")?
        };
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let documents_url = endpoint
            .join(&format!(
                "databases/{database_id}/collections/{collection_id}/documents"
            ))
            .context("failed to build documents URL")?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(AppwriteClient {
            http_client,
            documents_url,
            project_id,
            api_key: self.api_key.filter(|k| !k.is_empty()),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                self.min_interval.unwrap_or(DEFAULT_MIN_INTERVAL),
            ))),
        })
    }
}

impl AppwriteClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> AppwriteClientBuilder {
        AppwriteClientBuilder::new()
    }

    /// URL of a single document.
    fn document_url(&self, document_id: &str) -> Result<Url> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("documents URL cannot be a base"))?
            .push(document_id);
        Ok(url)
    }

    /// Adds project and key headers.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Appwrite-Project", &self.project_id);
        match self.api_key {
            Some(ref key) => request.header("X-Appwrite-Key", key),
            None => request,
        }
    }

    /// Sends a request with rate limiting and decodes the JSON body.
    #[instrument(skip(self, request))]
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        let request = self
            .authorize(request)
            .build()
            .with_context(|| format!("failed to build request: {action}"))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "Appwrite API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .with_context(|| format!("request failed: {action}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {action}"))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<AppwriteErrorResponse>(&body) {
                bail!(
                    "Appwrite API error (HTTP {}): type={}, message={}",
                    status,
                    error_response.kind,
                    error_response.message,
                );
            }
            bail!("Appwrite API error (HTTP {status}): {body}");
        }

        serde_json::from_str(&body)
            .with_context(|| format!("failed to decode JSON response: {action}"))
    }

    /// Finds the record for an already normalized term.
    async fn find_by_term(&self, term: &str) -> Result<Option<TrendingEntry>> {
        let queries = [
            ("queries[]", equal_query("searchTerm", term)),
            ("queries[]", limit_query(1)),
        ];
        let request = self
            .http_client
            .get(self.documents_url.clone())
            .query(&queries);
        let list: DocumentList = self.send_json(request, "find trending term").await?;
        Ok(list.documents.into_iter().next())
    }
}

/// Builds an Appwrite `equal` query.
fn equal_query(attribute: &str, value: &str) -> String {
    json!({"method": "equal", "attribute": attribute, "values": [value]}).to_string()
}

/// Builds an Appwrite `orderDesc` query.
fn order_desc_query(attribute: &str) -> String {
    json!({"method": "orderDesc", "attribute": attribute}).to_string()
}

/// Builds an Appwrite `limit` query.
fn limit_query(limit: u32) -> String {
    json!({"method": "limit", "values": [limit]}).to_string()
}

impl TrendingApi for AppwriteClient {
    #[instrument(skip_all)]
    async fn record_search(&self, term: &str, seed: &TrendingSeed) -> Result<()> {
        let term = normalize_term(term);

        if let Some(existing) = self.find_by_term(&term).await? {
            let url = self.document_url(&existing.id)?;
            let body = json!({"data": {"count": existing.count.saturating_add(1)}});
            let updated: TrendingEntry = self
                .send_json(self.http_client.patch(url).json(&body), "increment count")
                .await?;
            tracing::debug!(term = %term, count = updated.count, "Trending count incremented");
        } else {
            let body = json!({
                "documentId": "unique()",
                "data": {
                    "searchTerm": term,
                    "count": 1,
                    "tmdb_id": seed.tmdb_id,
                    "title": seed.title,
                    "poster_url": seed.poster_url,
                },
            });
            let created: TrendingEntry = self
                .send_json(
                    self.http_client.post(self.documents_url.clone()).json(&body),
                    "create trending record",
                )
                .await?;
            tracing::debug!(term = %term, id = %created.id, "Trending record created");
        }

        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>> {
        let queries = [
            ("queries[]", order_desc_query("count")),
            ("queries[]", limit_query(limit)),
        ];
        let request = self
            .http_client
            .get(self.documents_url.clone())
            .query(&queries);
        let list: DocumentList = self.send_json(request, "list trending").await?;
        Ok(list.documents)
    }
}
