pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tracing::info;

use crate::commands::AppState;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::AppResult;

/// Installs logging, opens (and migrates) the database and wires the
/// services behind the command layer.
pub fn bootstrap(config: &AppConfig) -> AppResult<AppState> {
    crate::utils::logger::init_logging(config)?;

    let pool = DbPool::new(&config.database_path)?;
    let state = AppState::new(config.clone(), pool);

    info!(
        target: "app::config",
        db_path = %config.database_path.display(),
        cache_ttl = config.listing_cache_ttl_seconds,
        "internship reports ready"
    );
    Ok(state)
}
