pub mod reports;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::db::{DbPool, ReportStore, SqliteReportStore};
use crate::error::{AppError, ErrorKind, FieldErrors};
use crate::services::listing_cache::ListingCache;
use crate::services::report_events::ReportEventBus;
use crate::services::report_service::ReportService;

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: DbPool) -> Self {
        Self::with_store(config, Arc::new(SqliteReportStore::new(db_pool)))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn ReportStore>) -> Self {
        let cache = ListingCache::new(config.listing_cache_ttl_seconds);
        let report_service = Arc::new(ReportService::new(store, cache, ReportEventBus::new()));
        Self {
            config: Arc::new(config),
            report_service,
        }
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";

/// What a command was doing when it failed. Selects the message shown to the
/// user for persistence failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Fetch,
    Sign,
    Delete,
    Export,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to create report",
            Operation::Fetch => "Failed to fetch reports",
            Operation::Sign => "Failed to sign report",
            Operation::Delete => "Failed to delete report",
            Operation::Export => "Failed to export report",
        }
    }
}

/// Either a plain message or the per-field violations of a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseError {
    Message(String),
    Fields(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub code: &'static str,
    pub error: ResponseError,
}

impl CommandError {
    /// Internal detail is logged here and never leaves the process.
    pub fn from_app_error(error: AppError, operation: Operation) -> Self {
        match error.kind() {
            ErrorKind::Validation => {
                let fields = match error {
                    AppError::Validation { field_errors, .. } => field_errors,
                    _ => FieldErrors::new(),
                };
                warn!(target: "app::command", ?operation, errors = %fields, "command rejected");
                Self {
                    code: VALIDATION_ERROR,
                    error: ResponseError::Fields(fields),
                }
            }
            ErrorKind::NotFound => {
                warn!(target: "app::command", ?operation, "report not found");
                Self {
                    code: NOT_FOUND,
                    error: ResponseError::Message("Report not found".to_string()),
                }
            }
            ErrorKind::Persistence => {
                error!(target: "app::command", ?operation, error = %error, "command failed");
                Self::persistence(operation)
            }
        }
    }

    pub fn persistence(operation: Operation) -> Self {
        Self {
            code: PERSISTENCE_ERROR,
            error: ResponseError::Message(operation.failure_message().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(error: CommandError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.error),
            code: Some(error.code.to_string()),
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self.error.as_ref() {
            Some(ResponseError::Fields(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self.error.as_ref() {
            Some(ResponseError::Message(message)) => Some(message),
            _ => None,
        }
    }
}

impl CommandResponse<()> {
    /// Drops the unit payload so a success serialises as `{"success": true}`.
    pub fn status_only(self) -> Self {
        Self { data: None, ..self }
    }
}

impl<T> From<Result<T, CommandError>> for CommandResponse<T> {
    fn from(result: Result<T, CommandError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::failure(error),
        }
    }
}
