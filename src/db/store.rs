//! Narrow persistence interface consumed by the report lifecycle.
//!
//! Every aggregate write (parent plus owned children) is a single transaction,
//! and every read-with-children runs in one read transaction so parent and
//! child rows come from the same snapshot.

use crate::db::repositories::end_of_term_report_repository::{
    EndOfTermReportRepository, EndOfTermReportRow,
};
use crate::db::repositories::weekly_report_repository::{
    WeeklyReportRepository, WeeklyReportRow,
};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::end_of_term_report::EndOfTermReportRecord;
use crate::models::weekly_report::WeeklyReportRecord;

pub trait ReportStore: Send + Sync {
    fn insert_weekly(&self, record: &WeeklyReportRecord) -> AppResult<()>;
    fn list_weekly(&self) -> AppResult<Vec<WeeklyReportRecord>>;
    fn find_weekly(&self, id: &str) -> AppResult<Option<WeeklyReportRecord>>;
    /// Returns the report as committed. Fails with `NotFound` when no report has `id`.
    fn mark_weekly_signed(&self, id: &str) -> AppResult<WeeklyReportRecord>;
    /// Fails with `NotFound` when no report has `id`.
    fn delete_weekly(&self, id: &str) -> AppResult<()>;

    fn insert_end_of_term(&self, record: &EndOfTermReportRecord) -> AppResult<()>;
    fn list_end_of_term(&self) -> AppResult<Vec<EndOfTermReportRecord>>;
    fn find_end_of_term(&self, id: &str) -> AppResult<Option<EndOfTermReportRecord>>;
    /// Returns the report as committed. Fails with `NotFound` when no report has `id`.
    fn sign_end_of_term(
        &self,
        id: &str,
        signature: &str,
        signed_at: &str,
    ) -> AppResult<EndOfTermReportRecord>;
    /// Fails with `NotFound` when no report has `id`.
    fn delete_end_of_term(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone, Debug)]
pub struct SqliteReportStore {
    db: DbPool,
}

impl SqliteReportStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &DbPool {
        &self.db
    }
}

impl ReportStore for SqliteReportStore {
    fn insert_weekly(&self, record: &WeeklyReportRecord) -> AppResult<()> {
        let (report, tasks) = WeeklyReportRow::from_record(record);
        self.db
            .with_transaction(|conn| WeeklyReportRepository::insert(conn, &report, &tasks))
    }

    fn list_weekly(&self) -> AppResult<Vec<WeeklyReportRecord>> {
        self.db.with_transaction(WeeklyReportRepository::list_all)
    }

    fn find_weekly(&self, id: &str) -> AppResult<Option<WeeklyReportRecord>> {
        self.db
            .with_transaction(|conn| WeeklyReportRepository::find_by_id(conn, id))
    }

    fn mark_weekly_signed(&self, id: &str) -> AppResult<WeeklyReportRecord> {
        self.db.with_transaction(|conn| {
            WeeklyReportRepository::mark_signed(conn, id)?;
            WeeklyReportRepository::find_by_id(conn, id)?.ok_or_else(AppError::not_found)
        })
    }

    fn delete_weekly(&self, id: &str) -> AppResult<()> {
        self.db
            .with_transaction(|conn| WeeklyReportRepository::delete(conn, id))
    }

    fn insert_end_of_term(&self, record: &EndOfTermReportRecord) -> AppResult<()> {
        let (report, items) = EndOfTermReportRow::from_record(record);
        self.db
            .with_transaction(|conn| EndOfTermReportRepository::insert(conn, &report, &items))
    }

    fn list_end_of_term(&self) -> AppResult<Vec<EndOfTermReportRecord>> {
        self.db.with_transaction(EndOfTermReportRepository::list_all)
    }

    fn find_end_of_term(&self, id: &str) -> AppResult<Option<EndOfTermReportRecord>> {
        self.db
            .with_transaction(|conn| EndOfTermReportRepository::find_by_id(conn, id))
    }

    fn sign_end_of_term(
        &self,
        id: &str,
        signature: &str,
        signed_at: &str,
    ) -> AppResult<EndOfTermReportRecord> {
        self.db.with_transaction(|conn| {
            EndOfTermReportRepository::set_supervisor_signature(conn, id, signature, signed_at)?;
            EndOfTermReportRepository::find_by_id(conn, id)?.ok_or_else(AppError::not_found)
        })
    }

    fn delete_end_of_term(&self, id: &str) -> AppResult<()> {
        self.db
            .with_transaction(|conn| EndOfTermReportRepository::delete(conn, id))
    }
}
