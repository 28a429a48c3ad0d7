use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::db::ReportStore;
use crate::error::{AppError, AppResult};
use crate::models::end_of_term_report::{
    EndOfTermReportCreateInput, EndOfTermReportRecord, ScoreItemRecord,
};
use crate::models::report::{Report, ReportKind, ReportPayload};
use crate::models::weekly_report::{
    WeeklyReportCreateInput, WeeklyReportRecord, WeeklyTaskRecord,
};
use crate::services::listing_cache::ListingCache;
use crate::services::report_events::{ReportChange, ReportEventBus};
use crate::services::validation::{
    validate_end_of_term, validate_signer, validate_weekly,
};

/// Create, list, sign and delete reports of both kinds.
///
/// Every mutation either commits the whole aggregate or nothing. After a
/// commit the kind's listing cache is dropped and a `ReportEvent` goes out.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    cache: ListingCache,
    events: ReportEventBus,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, cache: ListingCache, events: ReportEventBus) -> Self {
        Self {
            store,
            cache,
            events,
        }
    }

    pub fn events(&self) -> &ReportEventBus {
        &self.events
    }

    pub fn create(&self, payload: ReportPayload) -> AppResult<Report> {
        let report = match payload {
            ReportPayload::Weekly(input) => Report::Weekly(self.create_weekly(input)?),
            ReportPayload::EndOfTerm(input) => Report::EndOfTerm(self.create_end_of_term(input)?),
        };
        self.committed(report.kind(), report.id(), ReportChange::Created);
        Ok(report)
    }

    pub fn list(&self, kind: ReportKind) -> AppResult<Vec<Report>> {
        if let Some(cached) = self.cache.get(kind) {
            return Ok(cached);
        }

        // Taken before the read so a commit that lands mid-read keeps the
        // stale listing out of the cache.
        let generation = self.cache.generation(kind);
        let reports: Vec<Report> = match kind {
            ReportKind::Weekly => self
                .store
                .list_weekly()?
                .into_iter()
                .map(Report::Weekly)
                .collect(),
            ReportKind::EndOfTerm => self
                .store
                .list_end_of_term()?
                .into_iter()
                .map(Report::EndOfTerm)
                .collect(),
        };
        debug!(target: "app::reports", kind = %kind, count = reports.len(), "reports listed");

        self.cache.put(kind, generation, reports.clone());
        Ok(reports)
    }

    pub fn get(&self, kind: ReportKind, id: &str) -> AppResult<Report> {
        let report = match kind {
            ReportKind::Weekly => self.store.find_weekly(id)?.map(Report::Weekly),
            ReportKind::EndOfTerm => self.store.find_end_of_term(id)?.map(Report::EndOfTerm),
        };
        let report = report.ok_or_else(AppError::not_found)?;
        debug!(target: "app::reports", kind = %kind, report_id = %id, "report fetched");
        Ok(report)
    }

    /// Weekly reports ignore `signer`; end-of-term reports require it and
    /// stamp the signature date with the time of this call.
    ///
    /// The returned report is read back in the signing transaction.
    pub fn sign(&self, kind: ReportKind, id: &str, signer: Option<&str>) -> AppResult<Report> {
        let report = match kind {
            ReportKind::Weekly => {
                let record = self.store.mark_weekly_signed(id)?;
                info!(
                    target: "app::reports",
                    report_id = %id,
                    signer = signer.unwrap_or_default(),
                    "weekly report signed"
                );
                Report::Weekly(record)
            }
            ReportKind::EndOfTerm => {
                let signature = validate_signer(signer)?;
                let signed_at = timestamp_now();
                let record = self.store.sign_end_of_term(id, &signature, &signed_at)?;
                info!(
                    target: "app::reports",
                    report_id = %id,
                    %signature,
                    %signed_at,
                    "end of term report signed"
                );
                Report::EndOfTerm(record)
            }
        };

        self.committed(kind, id, ReportChange::Signed);
        Ok(report)
    }

    pub fn delete(&self, kind: ReportKind, id: &str) -> AppResult<()> {
        match kind {
            ReportKind::Weekly => self.store.delete_weekly(id)?,
            ReportKind::EndOfTerm => self.store.delete_end_of_term(id)?,
        }
        info!(target: "app::reports", kind = %kind, report_id = %id, "report deleted");
        self.committed(kind, id, ReportChange::Deleted);
        Ok(())
    }

    fn create_weekly(&self, input: WeeklyReportCreateInput) -> AppResult<WeeklyReportRecord> {
        validate_weekly(&input)?;

        let id = uuid::Uuid::new_v4().to_string();
        let record = WeeklyReportRecord {
            id,
            student_name: input.student_name.trim().to_string(),
            student_id: input.student_id,
            organisation: input.organisation.trim().to_string(),
            industry_supervisor: input.industry_supervisor.trim().to_string(),
            date_prepared: input.date_prepared.trim().to_string(),
            week_number: input.week_number,
            tasks: input
                .tasks
                .into_iter()
                .map(|task| WeeklyTaskRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    day: task.day,
                    date: task.date.trim().to_string(),
                    description: task.description.trim().to_string(),
                    hours_spent: task.hours_spent,
                })
                .collect(),
            plans_for_next_week: input.plans_for_next_week.trim().to_string(),
            // Stored exactly as submitted.
            total_hours: input.total_hours,
            is_signed: false,
            created_at: timestamp_now(),
        };

        self.store.insert_weekly(&record)?;
        info!(
            target: "app::reports",
            report_id = %record.id,
            week = record.week_number,
            tasks = record.tasks.len(),
            "weekly report created"
        );
        Ok(record)
    }

    fn create_end_of_term(
        &self,
        input: EndOfTermReportCreateInput,
    ) -> AppResult<EndOfTermReportRecord> {
        validate_end_of_term(&input)?;

        let id = uuid::Uuid::new_v4().to_string();
        let record = EndOfTermReportRecord {
            id,
            student_name: input.student_name.trim().to_string(),
            student_id: input.student_id,
            organisation: input.organisation.trim().to_string(),
            industry_supervisor: input.industry_supervisor.trim().to_string(),
            date_of_submit: input.date_of_submit.trim().to_string(),
            score_items: input
                .score_items
                .into_iter()
                .map(|item| ScoreItemRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    question: item.question.trim().to_string(),
                    score: item.score,
                })
                .collect(),
            student_comments: input.student_comments.trim().to_string(),
            supervisor_comments: input.supervisor_comments.trim().to_string(),
            student_signature: input.student_signature.trim().to_string(),
            student_signature_date: input.student_signature_date.trim().to_string(),
            supervisor_signature: None,
            supervisor_signature_date: None,
            created_at: timestamp_now(),
        };

        self.store.insert_end_of_term(&record)?;
        info!(
            target: "app::reports",
            report_id = %record.id,
            "end of term report created"
        );
        Ok(record)
    }

    fn committed(&self, kind: ReportKind, id: &str, change: ReportChange) {
        self.cache.invalidate(kind);
        self.events.publish(kind, id, change);
    }
}

/// Fixed-width UTC timestamps sort lexicographically in creation order.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}
