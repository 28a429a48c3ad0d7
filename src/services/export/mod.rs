//! Printable PDF renditions of stored reports.

mod forms;
pub mod layout;
pub mod pdf;

use serde::Serialize;
use tracing::debug;

use crate::error::AppResult;
use crate::models::report::Report;
use crate::utils::digest::document_digest;

pub use forms::{END_OF_TERM_TITLE, WEEKLY_TITLE};

pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub sha256: String,
}

/// Renders `report` as a single A4 page. Reads nothing but its argument, so
/// the same report always yields the same bytes.
pub fn render_report(report: &Report) -> AppResult<RenderedDocument> {
    let mut page = pdf::PdfPage::new();
    match report {
        Report::Weekly(weekly) => forms::draw_weekly(&mut page, weekly),
        Report::EndOfTerm(end_of_term) => forms::draw_end_of_term(&mut page, end_of_term),
    }
    let bytes = page.finish()?;

    let document = RenderedDocument {
        file_name: file_name(report),
        mime_type: PDF_MIME_TYPE.to_string(),
        sha256: document_digest(&bytes),
        bytes,
    };
    debug!(
        target: "app::export",
        report_id = %report.id(),
        file_name = %document.file_name,
        size = document.bytes.len(),
        "report rendered"
    );
    Ok(document)
}

pub fn file_name(report: &Report) -> String {
    match report {
        Report::Weekly(weekly) => format!("weekly-report-week-{}.pdf", weekly.week_number),
        Report::EndOfTerm(end_of_term) => format!(
            "end-of-term-report-{}.pdf",
            file_name_safe(&end_of_term.student_name)
        ),
    }
}

/// Keeps the student's name but never lets it act as a path.
fn file_name_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '\0' => '-',
            other => other,
        })
        .collect()
}
