//! Interactive movie browser TUI.
//!
//! A single event loop owns `BrowserState` and multiplexes terminal input,
//! worker results, the search debounce deadline and the spinner tick.

/// Search box debounce.
pub mod debounce;
/// Browser state types.
pub mod state;
mod ui;
/// Background command execution.
pub mod worker;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cinefind_api::tmdb::TmdbApi;
use cinefind_api::trending::TrendingApi;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use self::state::{AppMessage, BrowserState, Command, Focus, RequestState};
use self::worker::Worker;

/// Spinner animation frame interval.
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Browser settings resolved from config.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// TMDB response language.
    pub language: String,
    /// Number of trending entries to show.
    pub trending_limit: u32,
    /// Search box debounce interval.
    pub debounce_interval: Duration,
}

/// Outcome of a key press.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    /// Nothing to do beyond redrawing.
    Continue,
    /// Run a command on the worker.
    Dispatch(Command),
    /// Leave the browser.
    Quit,
}

impl From<Option<Command>> for KeyOutcome {
    fn from(command: Option<Command>) -> Self {
        command.map_or(Self::Continue, Self::Dispatch)
    }
}

/// Runs the movie browser TUI until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
#[allow(clippy::module_name_repetitions)]
pub async fn run_browser<T, S>(tmdb: Arc<T>, store: Arc<S>, options: BrowserOptions) -> Result<()>
where
    T: TmdbApi + Send + Sync + 'static,
    S: TrendingApi + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = Worker::new(tmdb, store, tx, options.language, options.trending_limit);
    let mut state = BrowserState::new(options.debounce_interval);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut state, &worker, rx).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
async fn run_event_loop<T, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState,
    worker: &Worker<T, S>,
    mut rx: mpsc::UnboundedReceiver<AppMessage>,
) -> Result<()>
where
    T: TmdbApi + Send + Sync + 'static,
    S: TrendingApi + Send + Sync + 'static,
{
    for command in state.start() {
        worker.dispatch(command);
    }

    let mut events = EventStream::new();
    let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
    spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("failed to draw TUI")?;

        let deadline = state.next_deadline();
        let busy = state.is_busy();

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(state, key, Instant::now()) {
                        KeyOutcome::Continue => {}
                        KeyOutcome::Dispatch(command) => worker.dispatch(command),
                        KeyOutcome::Quit => return Ok(()),
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("failed to read terminal event"),
                None => return Ok(()),
            },
            Some(message) = rx.recv() => {
                if let Some(command) = state.apply(message) {
                    worker.dispatch(command);
                }
            }
            () = sleep_until(deadline) => {
                if let Some(command) = state.tick(Instant::now()) {
                    worker.dispatch(command);
                }
            }
            _ = spinner.tick(), if busy => state.advance_spinner(),
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

/// Routes a key press by overlay and focus.
fn handle_key(state: &mut BrowserState, key: KeyEvent, now: Instant) -> KeyOutcome {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::Quit;
    }
    if state.details_open() {
        return handle_details_input(state, key.code);
    }
    match state.focus {
        Focus::Search => handle_search_input(state, key.code, now),
        Focus::Movies | Focus::Trending => handle_list_input(state, key.code),
    }
}

/// Handles key input while the detail overlay is shown.
fn handle_details_input(state: &mut BrowserState, key: KeyCode) -> KeyOutcome {
    match key {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Esc | KeyCode::Backspace => state.close_details(),
        KeyCode::Char('t') => open_trailer(state),
        _ => {}
    }
    KeyOutcome::Continue
}

/// Handles key input in the search box.
fn handle_search_input(state: &mut BrowserState, key: KeyCode, now: Instant) -> KeyOutcome {
    match key {
        KeyCode::Esc => state.clear_input(now),
        KeyCode::Backspace => state.input_backspace(now),
        KeyCode::Tab => state.focus_next(),
        KeyCode::BackTab => state.focus_prev(),
        KeyCode::Down | KeyCode::Enter => state.focus = Focus::Movies,
        KeyCode::Char(c) => state.input_char(c, now),
        _ => {}
    }
    KeyOutcome::Continue
}

/// Handles key input on the movie list or trending strip.
fn handle_list_input(state: &mut BrowserState, key: KeyCode) -> KeyOutcome {
    match key {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Tab => state.focus_next(),
        KeyCode::BackTab => state.focus_prev(),
        KeyCode::Esc | KeyCode::Char('/') => state.focus = Focus::Search,
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k' | 'h') => state.move_prev(),
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j' | 'l') => state.move_next(),
        KeyCode::Enter => {
            let command = if state.focus == Focus::Trending {
                state.open_trending(state.trending_cursor)
            } else {
                state.open_selected()
            };
            return command.into();
        }
        _ => {}
    }
    KeyOutcome::Continue
}

/// Opens the trailer of the loaded movie in the browser.
fn open_trailer(state: &BrowserState) {
    let RequestState::Loaded(details) = &state.details else {
        return;
    };
    let Some(url) = details.trailer().and_then(|v| v.watch_url()) else {
        tracing::debug!(movie_id = details.id, "No trailer to open");
        return;
    };
    if let Err(e) = open::that(&url) {
        tracing::warn!(%url, error = %e, "Failed to open trailer");
    }
}
