pub mod agents;
pub mod api;
pub mod config;
pub mod generator;
pub mod insights;
pub mod style;

use std::path::PathBuf;

/// Root used for `.env` and `config/` lookups when none is given.
pub fn default_app_root() -> PathBuf {
    std::env::var("ENHANCE_APP_ROOT")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}
