//! Movie browser state and transitions.
//!
//! `BrowserState` is driven only through input events and `AppMessage`s
//! and answers with `Command`s for the worker, so every transition can be
//! tested without a terminal or network.

use std::time::{Duration, Instant};

use cinefind_api::tmdb::{TmdbApiFailure, TmdbMovieDetails, TmdbMovieSummary};
use cinefind_api::trending::{TrendingEntry, TrendingSeed};
use ratatui::widgets::TableState;

use super::debounce::Debouncer;

/// Shown when a list request fails without an API-supplied message.
pub const LIST_ERROR_MESSAGE: &str = "Error fetching movies.";

/// Shown when a details request fails.
pub const DETAILS_ERROR_MESSAGE: &str = "Could not load movie details.";

/// Spinner animation frames.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lifecycle of one request flow.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    /// Nothing requested (or dismissed).
    Idle,
    /// Request in flight.
    Loading,
    /// Request succeeded.
    Loaded(T),
    /// Request failed with a user-facing message.
    Failed(String),
}

impl<T> RequestState<T> {
    /// Returns `true` while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` when nothing is requested.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns the loaded value, if any.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Focused area of the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Search box (typing edits the query).
    Search,
    /// Movie list.
    Movies,
    /// Trending strip.
    Trending,
}

/// Work requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List movies for `query` (blank lists popular movies).
    ListMovies {
        /// Request generation.
        generation: u64,
        /// Settled search box value.
        query: String,
    },
    /// Fetch details for one movie.
    FetchDetails {
        /// Request generation.
        generation: u64,
        /// TMDB movie ID.
        movie_id: u64,
    },
    /// Load the trending strip.
    LoadTrending,
    /// Record a successful search in the trending store.
    RecordSearch {
        /// Search term as typed.
        term: String,
        /// First result of the search.
        seed: TrendingSeed,
    },
}

/// Result reported back by the worker.
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// A list request finished.
    MoviesLoaded {
        /// Generation of the originating request.
        generation: u64,
        /// Movies, or a user-facing error message.
        result: Result<Vec<TmdbMovieSummary>, String>,
    },
    /// A details request finished.
    DetailsLoaded {
        /// Generation of the originating request.
        generation: u64,
        /// Details, or a user-facing error message.
        result: Result<Box<TmdbMovieDetails>, String>,
    },
    /// Trending entries loaded (empty on failure).
    TrendingLoaded(Vec<TrendingEntry>),
}

/// Maps a list request error to the message shown in place of the list.
///
/// API-flagged failures carry their own message; everything else
/// (transport, HTTP status, decoding) gets the generic one.
#[must_use]
pub fn list_error_message(err: &anyhow::Error) -> String {
    err.downcast_ref::<TmdbApiFailure>().map_or_else(
        || String::from(LIST_ERROR_MESSAGE),
        |failure| failure.message.clone(),
    )
}

/// State of the movie browser.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowserState {
    /// Search box contents.
    pub input: String,
    /// Focused area.
    pub focus: Focus,
    /// Movie list flow.
    pub movies: RequestState<Vec<TmdbMovieSummary>>,
    /// Detail overlay flow.
    pub details: RequestState<TmdbMovieDetails>,
    /// Trending strip flow.
    pub trending: RequestState<Vec<TrendingEntry>>,
    /// Table state for the movie list (handles selection and scroll).
    pub movie_table_state: TableState,
    /// Selected trending entry.
    pub trending_cursor: usize,
    /// Current spinner frame index.
    pub spinner_frame: usize,
    /// Pending search box value.
    debouncer: Debouncer<String>,
    /// Last value that settled, used to skip duplicate fetches.
    settled_query: Option<String>,
    /// Query of the current list request.
    movies_query: String,
    /// Generation of the current list request.
    movies_generation: u64,
    /// Generation of the current details request.
    details_generation: u64,
}

impl BrowserState {
    /// Creates an idle browser with the given search debounce interval.
    #[must_use]
    pub fn new(debounce_interval: Duration) -> Self {
        Self {
            input: String::new(),
            focus: Focus::Search,
            movies: RequestState::Idle,
            details: RequestState::Idle,
            trending: RequestState::Idle,
            movie_table_state: TableState::default(),
            trending_cursor: 0,
            spinner_frame: 0,
            debouncer: Debouncer::new(debounce_interval),
            settled_query: None,
            movies_query: String::new(),
            movies_generation: 0,
            details_generation: 0,
        }
    }

    /// Starts the popular list and trending loads.
    pub fn start(&mut self) -> Vec<Command> {
        self.settled_query = Some(String::new());
        self.trending = RequestState::Loading;
        vec![self.begin_list(String::new()), Command::LoadTrending]
    }

    // --- Search box ---

    /// Appends a character to the search box.
    pub fn input_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.input_changed(now);
    }

    /// Removes the last character of the search box.
    pub fn input_backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.input_changed(now);
        }
    }

    /// Empties the search box.
    pub fn clear_input(&mut self, now: Instant) {
        if !self.input.is_empty() {
            self.input.clear();
            self.input_changed(now);
        }
    }

    /// Re-arms the debounce with the trimmed search box value.
    ///
    /// A value equal to the last settled query drops the pending one, so
    /// edits that only add or remove surrounding whitespace never refetch.
    fn input_changed(&mut self, now: Instant) {
        let query = self.input.trim();
        if self.settled_query.as_deref() == Some(query) {
            tracing::debug!(%query, "Search box back at settled query");
            self.debouncer.cancel();
        } else {
            self.debouncer.push(String::from(query), now);
        }
    }

    /// Instant at which the pending search box value settles.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Settles the debounced search box value.
    ///
    /// Returns a list command once the pending value's deadline passes.
    pub fn tick(&mut self, now: Instant) -> Option<Command> {
        let query = self.debouncer.poll(now)?;
        self.settled_query = Some(query.clone());
        Some(self.begin_list(query))
    }

    fn begin_list(&mut self, query: String) -> Command {
        self.movies_generation = self.movies_generation.wrapping_add(1);
        self.movies = RequestState::Loading;
        self.movies_query.clone_from(&query);
        self.movie_table_state.select(None);
        Command::ListMovies {
            generation: self.movies_generation,
            query,
        }
    }

    // --- Results ---

    /// Applies a worker result.
    ///
    /// Results of superseded requests are dropped. A successful non-blank
    /// search with at least one result yields a `RecordSearch` for the
    /// first result, after the list has been stored.
    pub fn apply(&mut self, message: AppMessage) -> Option<Command> {
        match message {
            AppMessage::MoviesLoaded { generation, result } => {
                if generation != self.movies_generation {
                    tracing::debug!(
                        generation,
                        current = self.movies_generation,
                        "Dropping stale movie list"
                    );
                    return None;
                }
                match result {
                    Ok(movies) => {
                        let record = movies
                            .first()
                            .filter(|_| !self.movies_query.trim().is_empty())
                            .map(|first| Command::RecordSearch {
                                term: self.movies_query.clone(),
                                seed: TrendingSeed::from(first),
                            });
                        self.movie_table_state
                            .select(if movies.is_empty() { None } else { Some(0) });
                        self.movies = RequestState::Loaded(movies);
                        record
                    }
                    Err(message) => {
                        self.movies = RequestState::Failed(message);
                        None
                    }
                }
            }
            AppMessage::DetailsLoaded { generation, result } => {
                if generation != self.details_generation || self.details.is_idle() {
                    tracing::debug!(generation, "Dropping stale movie details");
                    return None;
                }
                self.details = match result {
                    Ok(details) => RequestState::Loaded(*details),
                    Err(message) => RequestState::Failed(message),
                };
                None
            }
            AppMessage::TrendingLoaded(entries) => {
                self.trending_cursor = 0;
                self.trending = RequestState::Loaded(entries);
                None
            }
        }
    }

    // --- Details ---

    /// Returns `true` while the detail overlay is shown.
    #[must_use]
    pub const fn details_open(&self) -> bool {
        !self.details.is_idle()
    }

    /// Opens details for the selected movie.
    pub fn open_selected(&mut self) -> Option<Command> {
        let movie_id = self.selected_movie()?.id;
        Some(self.open_details(movie_id))
    }

    /// Opens details for the trending entry at `index`.
    pub fn open_trending(&mut self, index: usize) -> Option<Command> {
        let movie_id = self.trending.loaded()?.get(index)?.tmdb_id;
        Some(self.open_details(movie_id))
    }

    fn open_details(&mut self, movie_id: u64) -> Command {
        self.details_generation = self.details_generation.wrapping_add(1);
        self.details = RequestState::Loading;
        Command::FetchDetails {
            generation: self.details_generation,
            movie_id,
        }
    }

    /// Closes the detail overlay, discarding any in-flight result.
    pub fn close_details(&mut self) {
        self.details = RequestState::Idle;
        self.details_generation = self.details_generation.wrapping_add(1);
    }

    // --- Navigation ---

    /// Returns the selected movie (if any).
    #[must_use]
    pub fn selected_movie(&self) -> Option<&TmdbMovieSummary> {
        let index = self.movie_table_state.selected()?;
        self.movies.loaded()?.get(index)
    }

    fn movie_count(&self) -> usize {
        self.movies.loaded().map_or(0, Vec::len)
    }

    fn trending_count(&self) -> usize {
        self.trending.loaded().map_or(0, Vec::len)
    }

    /// Moves the cursor of the focused list back by one.
    pub fn move_prev(&mut self) {
        match self.focus {
            Focus::Search => {}
            Focus::Movies => {
                let current = self.movie_table_state.selected().unwrap_or(0);
                if self.movie_count() > 0 {
                    self.movie_table_state.select(Some(current.saturating_sub(1)));
                }
            }
            Focus::Trending => {
                self.trending_cursor = self.trending_cursor.saturating_sub(1);
            }
        }
    }

    /// Moves the cursor of the focused list forward by one.
    pub fn move_next(&mut self) {
        match self.focus {
            Focus::Search => {}
            Focus::Movies => {
                let count = self.movie_count();
                if count > 0 {
                    let next = self
                        .movie_table_state
                        .selected()
                        .map_or(0, |i| i.saturating_add(1).min(count.saturating_sub(1)));
                    self.movie_table_state.select(Some(next));
                }
            }
            Focus::Trending => {
                let last = self.trending_count().saturating_sub(1);
                self.trending_cursor = self.trending_cursor.saturating_add(1).min(last);
            }
        }
    }

    /// Cycles focus: search box, movie list, trending strip.
    pub const fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Movies,
            Focus::Movies => Focus::Trending,
            Focus::Trending => Focus::Search,
        };
    }

    /// Cycles focus backwards.
    pub const fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Trending,
            Focus::Movies => Focus::Search,
            Focus::Trending => Focus::Movies,
        };
    }

    // --- Spinner ---

    /// Returns `true` while any flow is loading.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.movies.is_loading() || self.details.is_loading() || self.trending.is_loading()
    }

    /// Advances the spinner animation.
    pub fn advance_spinner(&mut self) {
        let next = self.spinner_frame.wrapping_add(1);
        self.spinner_frame = if next < SPINNER_FRAMES.len() { next } else { 0 };
    }

    /// Current spinner glyph.
    #[must_use]
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES
            .get(self.spinner_frame)
            .copied()
            .unwrap_or_default()
    }
}
