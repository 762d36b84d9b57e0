//! Application configuration module.
//!
//! Manages the TOML config file holding the TMDB language, the trending
//! store backend and browser tuning.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TmdbConfig, TrendingBackendKind, TrendingConfig};
pub use paths::resolve_config_path;
