use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

const ENV_DATABASE_PATH: &str = "REPORTS_DATABASE_PATH";
const ENV_LOG_DIR: &str = "REPORTS_LOG_DIR";
const ENV_LOG_DIRECTIVES: &str = "REPORTS_LOG";

const DEFAULT_DATABASE_PATH: &str = "data/internship-reports.sqlite";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_DIRECTIVES: &str = "info,app::db=info,app::reports=debug";
const DEFAULT_LISTING_CACHE_TTL_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// `None` keeps logs on the console only.
    pub log_dir: Option<PathBuf>,
    pub log_directives: String,
    /// Zero disables the listing cache.
    pub listing_cache_ttl_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_dir: Some(PathBuf::from(DEFAULT_LOG_DIR)),
            log_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
            listing_cache_ttl_seconds: DEFAULT_LISTING_CACHE_TTL_SECONDS,
        }
    }
}

impl AppConfig {
    /// Reads the YAML file when given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        debug!(target: "app::config", path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
            .map_err(|err| AppError::config(format!("invalid configuration file: {err}")))
    }

    /// An empty `REPORTS_LOG_DIR` turns file logging off.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|value| !value.trim().is_empty()) {
            self.database_path = PathBuf::from(path.trim());
        }

        if let Some(dir) = lookup(ENV_LOG_DIR) {
            let dir = dir.trim();
            self.log_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(directives) = lookup(ENV_LOG_DIRECTIVES).filter(|value| !value.trim().is_empty())
        {
            self.log_directives = directives.trim().to_string();
        }
    }
}
