//! cinefind - terminal movie browser backed by TMDB.

/// Application configuration (TOML).
mod config;
/// Trending store backend selection.
mod store;
/// Terminal UI components.
mod tui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{
    AppConfig, TmdbConfig, TrendingBackendKind, TrendingConfig, resolve_config_path,
};
use crate::store::TrendingBackend;
use crate::tui::{BrowserOptions, run_browser};
use cinefind_api::tmdb::{
    DiscoverMovieParams, LocalTmdbApi, SearchMovieParams, TmdbClient, TmdbMovieSummary,
};
use cinefind_api::trending::{AppwriteClient, LocalTrendingApi, TrendingSeed, normalize_term};
use cinefind_db::{SqliteTrendingStore, open_db, resolve_data_dir};

/// User-Agent sent to remote APIs.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Log file written while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "cinefind.log";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse and search movies interactively.
    Browse,
    /// Query TMDB API.
    Tmdb(TmdbCommand),
    /// Read or update the trending store.
    Trending(TrendingCommand),
}

/// Arguments for the `tmdb` subcommand.
#[derive(clap::Args)]
struct TmdbCommand {
    /// TMDB subcommand to run.
    #[command(subcommand)]
    command: TmdbSubcommands,
}

/// Available TMDB subcommands.
#[derive(Subcommand)]
enum TmdbSubcommands {
    /// List popular movies (`discover/movie`).
    Popular(TmdbPopularArgs),
    /// Search movies by title (`search/movie`).
    Search(TmdbSearchArgs),
    /// Show movie details with credits and videos.
    Details(TmdbDetailsArgs),
}

/// Arguments for the `tmdb popular` subcommand.
#[derive(clap::Args)]
struct TmdbPopularArgs {
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `tmdb search` subcommand.
#[derive(clap::Args)]
struct TmdbSearchArgs {
    /// Search query.
    #[arg(long)]
    query: String,

    /// Filter by release year.
    #[arg(long)]
    year: Option<u32>,
}

/// Arguments for the `tmdb details` subcommand.
#[derive(clap::Args)]
struct TmdbDetailsArgs {
    /// TMDB movie ID.
    #[arg(long)]
    id: u64,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingCommand {
    /// Trending subcommand to run.
    #[command(subcommand)]
    command: TrendingSubcommands,
}

/// Available trending subcommands.
#[derive(Subcommand)]
enum TrendingSubcommands {
    /// List the most searched terms.
    List(TrendingListArgs),
    /// Search TMDB and record the term with its first result.
    Record(TrendingRecordArgs),
}

/// Arguments for the `trending list` subcommand.
#[derive(clap::Args)]
struct TrendingListArgs {
    /// Number of entries (default: config `trending.limit`).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `trending record` subcommand.
#[derive(clap::Args)]
struct TrendingRecordArgs {
    /// Search term.
    #[arg(long)]
    query: String,
}

/// Reads the TMDB API token from the environment.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set.
fn require_tmdb_token() -> Result<String> {
    std::env::var("TMDB_API_TOKEN").context("TMDB_API_TOKEN environment variable is required")
}

/// Builds a TMDB client from config and an API token.
///
/// # Errors
///
/// Returns an error if the configured base URL is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &TmdbConfig, api_token: String) -> Result<TmdbClient> {
    let mut builder = TmdbClient::builder()
        .api_token(api_token)
        .user_agent(USER_AGENT);
    if let Some(base_url) = &config.base_url {
        let url = base_url
            .parse()
            .with_context(|| format!("invalid tmdb.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    builder.build().context("failed to build TMDB client")
}

/// Builds the configured trending store.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the Appwrite
/// settings are incomplete.
#[instrument(skip_all)]
fn build_trending_store(config: &TrendingConfig, dir: Option<&PathBuf>) -> Result<TrendingBackend> {
    let backend = match config.backend {
        TrendingBackendKind::Sqlite => {
            let conn = open_db(dir)?;
            TrendingBackend::Sqlite(SqliteTrendingStore::new(conn))
        }
        TrendingBackendKind::Appwrite => {
            let mut builder = AppwriteClient::builder().user_agent(USER_AGENT);
            if let Some(endpoint) = &config.endpoint {
                let url = endpoint
                    .parse()
                    .with_context(|| format!("invalid trending.endpoint: {endpoint}"))?;
                builder = builder.endpoint(url);
            }
            if let Some(id) = &config.project_id {
                builder = builder.project_id(id);
            }
            if let Some(id) = &config.database_id {
                builder = builder.database_id(id);
            }
            if let Some(id) = &config.collection_id {
                builder = builder.collection_id(id);
            }
            if let Ok(key) = std::env::var("APPWRITE_API_KEY") {
                builder = builder.api_key(key);
            }
            TrendingBackend::Appwrite(builder.build().context("failed to build Appwrite client")?)
        }
    };
    tracing::debug!(backend = backend.name(), "Trending store ready");
    Ok(backend)
}

/// Logs one movie summary row.
fn log_movie_row(movie: &TmdbMovieSummary) {
    tracing::info!(
        "{}\t{}\t{}\t{:.1}\t{}",
        movie.id,
        movie.title,
        movie.original_language,
        movie.vote_average,
        movie.release_date.as_deref().unwrap_or("-"),
    );
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if a client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(config: &AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let api_token = require_tmdb_token().unwrap_or_else(|e| {
        tracing::warn!("{e}; requests will fail authorization");
        String::new()
    });
    let tmdb = build_tmdb_client(&config.tmdb, api_token)?;
    let store = build_trending_store(&config.trending, dir)?;

    let options = BrowserOptions {
        language: config.tmdb.language.clone(),
        trending_limit: config.trending.limit,
        debounce_interval: config.browser.debounce_interval(),
    };
    run_browser(Arc::new(tmdb), Arc::new(store), options).await
}

/// Runs the `tmdb popular` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb_popular(config: &AppConfig, args: &TmdbPopularArgs) -> Result<()> {
    let client = build_tmdb_client(&config.tmdb, require_tmdb_token()?)?;

    let params = DiscoverMovieParams::default()
        .language(&config.tmdb.language)
        .page(args.page);
    let response = client
        .discover_movies(&params)
        .await
        .context("TMDB discover/movie request failed")?;

    tracing::info!(
        "Page {}/{} ({} results)",
        response.page,
        response.total_pages,
        response.total_results
    );
    tracing::info!("ID\tTitle\tOrigLang\tRating\tReleaseDate");
    response.results.iter().for_each(log_movie_row);

    Ok(())
}

/// Runs the `tmdb search` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb_search(config: &AppConfig, args: &TmdbSearchArgs) -> Result<()> {
    let client = build_tmdb_client(&config.tmdb, require_tmdb_token()?)?;

    let mut params = SearchMovieParams::new(&args.query).language(&config.tmdb.language);
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let response = client
        .search_movie(&params)
        .await
        .context("TMDB search/movie request failed")?;

    tracing::info!("Total results: {}", response.total_results);
    tracing::info!("ID\tTitle\tOrigLang\tRating\tReleaseDate");
    response.results.iter().for_each(log_movie_row);

    Ok(())
}

/// Runs the `tmdb details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tmdb_details(config: &AppConfig, args: &TmdbDetailsArgs) -> Result<()> {
    let client = build_tmdb_client(&config.tmdb, require_tmdb_token()?)?;

    let details = client
        .movie_details(args.id, &config.tmdb.language)
        .await
        .context("TMDB movie details request failed")?;

    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    let cast: Vec<&str> = details
        .top_cast(5)
        .into_iter()
        .map(|c| c.name.as_str())
        .collect();

    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    tracing::info!("Original title: {}", details.original_title);
    tracing::info!("Released: {}", details.release_date.as_deref().unwrap_or("-"));
    tracing::info!(
        "Runtime: {}",
        details
            .runtime
            .map_or_else(|| String::from("-"), |m| format!("{m} min"))
    );
    tracing::info!("Rating: {:.1} ({} votes)", details.vote_average, details.vote_count);
    tracing::info!("Genres: {}", genres.join(", "));
    tracing::info!("Director: {}", details.directors().join(", "));
    tracing::info!("Cast: {}", cast.join(", "));
    if let Some(url) = details.trailer().and_then(|v| v.watch_url()) {
        tracing::info!("Trailer: {url}");
    }
    if let Some(poster) = details.poster_url() {
        tracing::info!("Poster: {poster}");
    }
    tracing::info!("{}", details.overview.as_deref().unwrap_or(""));

    Ok(())
}

/// Runs the `trending list` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or read.
#[instrument(skip_all)]
async fn run_trending_list(
    config: &AppConfig,
    args: &TrendingListArgs,
    dir: Option<&PathBuf>,
) -> Result<()> {
    let store = build_trending_store(&config.trending, dir)?;
    let limit = args.limit.unwrap_or(config.trending.limit);

    let entries = store
        .list_trending(limit)
        .await
        .context("failed to list trending searches")?;

    if entries.is_empty() {
        tracing::info!("No trending searches recorded");
        return Ok(());
    }

    tracing::info!("Rank\tCount\tTerm\tTMDB\tTitle");
    for (rank, entry) in (1_u32..).zip(&entries) {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            rank,
            entry.count,
            entry.search_term,
            entry.tmdb_id,
            entry.title,
        );
    }

    Ok(())
}

/// Runs the `trending record` subcommand.
///
/// # Errors
///
/// Returns an error if the search fails, finds nothing, or the store write fails.
#[instrument(skip_all)]
async fn run_trending_record(
    config: &AppConfig,
    args: &TrendingRecordArgs,
    dir: Option<&PathBuf>,
) -> Result<()> {
    let term = args.query.trim();
    anyhow::ensure!(!term.is_empty(), "query must not be blank");

    let client = build_tmdb_client(&config.tmdb, require_tmdb_token()?)?;
    let store = build_trending_store(&config.trending, dir)?;

    let params = SearchMovieParams::new(term).language(&config.tmdb.language);
    let response = client
        .search_movie(&params)
        .await
        .context("TMDB search/movie request failed")?;
    let first = response
        .results
        .first()
        .with_context(|| format!("no movies found for {term:?}"))?;

    store
        .record_search(term, &TrendingSeed::from(first))
        .await
        .context("failed to record search")?;

    tracing::info!(
        "Recorded {:?} -> {} ({})",
        normalize_term(term),
        first.title,
        first.id
    );
    Ok(())
}

/// Installs the global tracing subscriber.
///
/// Logs go to `{log_dir}/cinefind.log` when `log_dir` is given (the TUI owns
/// the terminal), otherwise to stdout.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
fn init_tracing(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, ansi) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            (BoxMakeWriter::new(appender), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    let log_dir = match cli.command {
        Commands::Browse => Some(resolve_data_dir(dir)?),
        Commands::Tmdb(_) | Commands::Trending(_) => None,
    };
    init_tracing(log_dir.as_deref())?;

    let config_path = resolve_config_path(dir)?;
    let config = AppConfig::load(&config_path)?;

    match cli.command {
        Commands::Browse => run_browse(&config, dir).await,
        Commands::Tmdb(tmdb) => match tmdb.command {
            TmdbSubcommands::Popular(args) => run_tmdb_popular(&config, &args).await,
            TmdbSubcommands::Search(args) => run_tmdb_search(&config, &args).await,
            TmdbSubcommands::Details(args) => run_tmdb_details(&config, &args).await,
        },
        Commands::Trending(trending) => match trending.command {
            TrendingSubcommands::List(args) => run_trending_list(&config, &args, dir).await,
            TrendingSubcommands::Record(args) => run_trending_record(&config, &args, dir).await,
        },
    }
}
