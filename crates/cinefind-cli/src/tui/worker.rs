//! Executes browser commands as background tasks.

use std::sync::Arc;

use cinefind_api::tmdb::{TmdbApi, list_movies};
use cinefind_api::trending::{TrendingApi, load_trending_or_empty};
use tokio::sync::mpsc::UnboundedSender;
use tracing::instrument;

use super::state::{AppMessage, Command, DETAILS_ERROR_MESSAGE, list_error_message};

/// Spawns one task per command and reports results as `AppMessage`s.
#[derive(Debug)]
pub struct Worker<T, S> {
    /// TMDB client.
    tmdb: Arc<T>,
    /// Trending store.
    store: Arc<S>,
    /// Result channel back to the event loop.
    tx: UnboundedSender<AppMessage>,
    /// TMDB response language.
    language: String,
    /// Number of trending entries to load.
    trending_limit: u32,
}

impl<T, S> Worker<T, S>
where
    T: TmdbApi + Send + Sync + 'static,
    S: TrendingApi + Send + Sync + 'static,
{
    /// Creates a worker sending results on `tx`.
    pub fn new(
        tmdb: Arc<T>,
        store: Arc<S>,
        tx: UnboundedSender<AppMessage>,
        language: impl Into<String>,
        trending_limit: u32,
    ) -> Self {
        Self {
            tmdb,
            store,
            tx,
            language: language.into(),
            trending_limit,
        }
    }

    /// Runs `command` on a spawned task.
    ///
    /// `RecordSearch` is fire-and-forget: its outcome is only logged.
    pub fn dispatch(&self, command: Command) {
        let tmdb = Arc::clone(&self.tmdb);
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let language = self.language.clone();
        let trending_limit = self.trending_limit;

        tokio::spawn(async move {
            let message = match command {
                Command::ListMovies { generation, query } => {
                    Some(run_list(&*tmdb, generation, &query, &language).await)
                }
                Command::FetchDetails {
                    generation,
                    movie_id,
                } => Some(run_details(&*tmdb, generation, movie_id, &language).await),
                Command::LoadTrending => Some(AppMessage::TrendingLoaded(
                    load_trending_or_empty(&*store, trending_limit).await,
                )),
                Command::RecordSearch { term, seed } => {
                    if let Err(e) = store.record_search(&term, &seed).await {
                        tracing::warn!(%term, error = %e, "Failed to record search");
                    }
                    None
                }
            };
            if let Some(message) = message
                && tx.send(message).is_err()
            {
                tracing::debug!("Browser closed before result was delivered");
            }
        });
    }
}

#[instrument(skip(tmdb, language))]
async fn run_list(
    tmdb: &(impl TmdbApi + Sync),
    generation: u64,
    query: &str,
    language: &str,
) -> AppMessage {
    let result = match list_movies(tmdb, query, language).await {
        Ok(page) => {
            tracing::debug!(count = page.results.len(), "Movies loaded");
            Ok(page.results)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list movies");
            Err(list_error_message(&e))
        }
    };
    AppMessage::MoviesLoaded { generation, result }
}

#[instrument(skip(tmdb, language))]
async fn run_details(
    tmdb: &(impl TmdbApi + Sync),
    generation: u64,
    movie_id: u64,
    language: &str,
) -> AppMessage {
    let result = match tmdb.movie_details(movie_id, language).await {
        Ok(details) => Ok(Box::new(details)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch movie details");
            Err(String::from(DETAILS_ERROR_MESSAGE))
        }
    };
    AppMessage::DetailsLoaded { generation, result }
}
