use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::AppResult;
use crate::models::report::{Report, ReportKind, ReportPayload};
use crate::services::export::{render_report, RenderedDocument};
use crate::utils::digest::encode_document;

use super::{AppState, CommandError, CommandResponse, Operation};

/// A rendered report on its way to the UI, bytes base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime_type: String,
    pub content_base64: String,
    pub sha256: String,
}

impl From<RenderedDocument> for ExportedDocument {
    fn from(document: RenderedDocument) -> Self {
        Self {
            content_base64: encode_document(&document.bytes),
            file_name: document.file_name,
            mime_type: document.mime_type,
            sha256: document.sha256,
        }
    }
}

pub async fn reports_create(state: &AppState, payload: ReportPayload) -> CommandResponse<Report> {
    let service = state.reports();
    run_blocking(Operation::Create, move || service.create(payload)).await
}

pub async fn reports_list(state: &AppState, kind: ReportKind) -> CommandResponse<Vec<Report>> {
    let service = state.reports();
    run_blocking(Operation::Fetch, move || service.list(kind)).await
}

pub async fn reports_get(state: &AppState, kind: ReportKind, id: String) -> CommandResponse<Report> {
    let service = state.reports();
    run_blocking(Operation::Fetch, move || service.get(kind, &id)).await
}

pub async fn reports_sign(
    state: &AppState,
    kind: ReportKind,
    id: String,
    signature: Option<String>,
) -> CommandResponse<Report> {
    let service = state.reports();
    run_blocking(Operation::Sign, move || {
        service.sign(kind, &id, signature.as_deref())
    })
    .await
}

pub async fn reports_delete(state: &AppState, kind: ReportKind, id: String) -> CommandResponse<()> {
    let service = state.reports();
    run_blocking(Operation::Delete, move || service.delete(kind, &id))
        .await
        .status_only()
}

pub async fn reports_export(
    state: &AppState,
    kind: ReportKind,
    id: String,
) -> CommandResponse<ExportedDocument> {
    let service = state.reports();
    run_blocking(Operation::Export, move || {
        let report = service.get(kind, &id)?;
        let document = render_report(&report)?;
        Ok(ExportedDocument::from(document))
    })
    .await
}

async fn run_blocking<T: Send + 'static>(
    operation: Operation,
    task: impl FnOnce() -> AppResult<T> + Send + 'static,
) -> CommandResponse<T> {
    let outcome = match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(|err| CommandError::from_app_error(err, operation)),
        Err(join_error) => {
            error!(target: "app::command", ?operation, error = %join_error, "blocking task failed");
            Err(CommandError::persistence(operation))
        }
    };
    debug!(target: "app::command", ?operation, success = outcome.is_ok(), "command finished");
    CommandResponse::from(outcome)
}
