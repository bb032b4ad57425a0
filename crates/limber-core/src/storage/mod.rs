mod config;
pub mod database;

pub use config::{Config, FeedbackConfig, FilterConfig};
pub use database::{Database, HistoryStats};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/limber[-dev]/` based on LIMBER_ENV.
///
/// Set LIMBER_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LIMBER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("limber-dev")
    } else {
        base_dir.join("limber")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
