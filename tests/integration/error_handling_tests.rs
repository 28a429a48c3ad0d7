// Failure paths: persistence errors, panics in blocking work, and conflicts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use internship_reports_lib::commands::reports::{
    reports_create, reports_delete, reports_export, reports_list, reports_sign,
};
use internship_reports_lib::commands::{AppState, PERSISTENCE_ERROR, VALIDATION_ERROR};
use internship_reports_lib::config::AppConfig;
use internship_reports_lib::db::{DbPool, ReportStore, SqliteReportStore};
use internship_reports_lib::error::{AppError, AppResult};
use internship_reports_lib::models::end_of_term_report::EndOfTermReportRecord;
use internship_reports_lib::models::report::{ReportKind, ReportPayload};
use internship_reports_lib::models::weekly_report::{
    WeeklyReportCreateInput, WeeklyReportRecord, WeeklyTaskInput,
};
use internship_reports_lib::services::listing_cache::ListingCache;
use internship_reports_lib::services::report_events::ReportEventBus;
use internship_reports_lib::services::report_service::ReportService;
use tempfile::tempdir;

/// Every call fails the way a locked or corrupt database would.
struct UnavailableStore {
    calls: AtomicUsize,
}

impl UnavailableStore {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn fail<T>(&self) -> AppResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::database("database is locked"))
    }
}

impl ReportStore for UnavailableStore {
    fn insert_weekly(&self, _record: &WeeklyReportRecord) -> AppResult<()> {
        self.fail()
    }
    fn list_weekly(&self) -> AppResult<Vec<WeeklyReportRecord>> {
        self.fail()
    }
    fn find_weekly(&self, _id: &str) -> AppResult<Option<WeeklyReportRecord>> {
        self.fail()
    }
    fn mark_weekly_signed(&self, _id: &str) -> AppResult<WeeklyReportRecord> {
        self.fail()
    }
    fn delete_weekly(&self, _id: &str) -> AppResult<()> {
        self.fail()
    }
    fn insert_end_of_term(&self, _record: &EndOfTermReportRecord) -> AppResult<()> {
        self.fail()
    }
    fn list_end_of_term(&self) -> AppResult<Vec<EndOfTermReportRecord>> {
        self.fail()
    }
    fn find_end_of_term(&self, _id: &str) -> AppResult<Option<EndOfTermReportRecord>> {
        self.fail()
    }
    fn sign_end_of_term(
        &self,
        _id: &str,
        _signature: &str,
        _signed_at: &str,
    ) -> AppResult<EndOfTermReportRecord> {
        self.fail()
    }
    fn delete_end_of_term(&self, _id: &str) -> AppResult<()> {
        self.fail()
    }
}

/// Lists panic; everything else is unreachable in these tests.
struct PanickingStore;

impl ReportStore for PanickingStore {
    fn insert_weekly(&self, _record: &WeeklyReportRecord) -> AppResult<()> {
        panic!("insert_weekly");
    }
    fn list_weekly(&self) -> AppResult<Vec<WeeklyReportRecord>> {
        panic!("storage driver crashed");
    }
    fn find_weekly(&self, _id: &str) -> AppResult<Option<WeeklyReportRecord>> {
        panic!("find_weekly");
    }
    fn mark_weekly_signed(&self, _id: &str) -> AppResult<WeeklyReportRecord> {
        panic!("mark_weekly_signed");
    }
    fn delete_weekly(&self, _id: &str) -> AppResult<()> {
        panic!("delete_weekly");
    }
    fn insert_end_of_term(&self, _record: &EndOfTermReportRecord) -> AppResult<()> {
        panic!("insert_end_of_term");
    }
    fn list_end_of_term(&self) -> AppResult<Vec<EndOfTermReportRecord>> {
        panic!("list_end_of_term");
    }
    fn find_end_of_term(&self, _id: &str) -> AppResult<Option<EndOfTermReportRecord>> {
        panic!("find_end_of_term");
    }
    fn sign_end_of_term(
        &self,
        _id: &str,
        _signature: &str,
        _signed_at: &str,
    ) -> AppResult<EndOfTermReportRecord> {
        panic!("sign_end_of_term");
    }
    fn delete_end_of_term(&self, _id: &str) -> AppResult<()> {
        panic!("delete_end_of_term");
    }
}

fn quiet_config() -> AppConfig {
    AppConfig {
        log_dir: None,
        ..AppConfig::default()
    }
}

fn weekly_payload() -> ReportPayload {
    ReportPayload::Weekly(WeeklyReportCreateInput {
        student_name: "Katherine Johnson".to_string(),
        student_id: 196_201,
        organisation: "NACA".to_string(),
        industry_supervisor: "Dorothy Vaughan".to_string(),
        date_prepared: "2025-02-20".to_string(),
        week_number: 8,
        tasks: vec![WeeklyTaskInput {
            day: 3,
            date: "2025-02-19".to_string(),
            description: "Trajectory checks".to_string(),
            hours_spent: 9.0,
        }],
        plans_for_next_week: "Verify orbital insertion".to_string(),
        total_hours: 9.0,
    })
}

#[tokio::test]
async fn test_persistence_failure_uses_generic_messages() {
    let store = Arc::new(UnavailableStore::new());
    let state = AppState::with_store(quiet_config(), store.clone());

    let created = reports_create(&state, weekly_payload()).await;
    assert_eq!(created.code.as_deref(), Some(PERSISTENCE_ERROR));
    assert_eq!(created.message(), Some("Failed to create report"));

    let listed = reports_list(&state, ReportKind::EndOfTerm).await;
    assert_eq!(listed.code.as_deref(), Some(PERSISTENCE_ERROR));
    assert_eq!(listed.message(), Some("Failed to fetch reports"));
    assert!(listed.data.is_none());

    let signed = reports_sign(&state, ReportKind::Weekly, "any".into(), None).await;
    assert_eq!(signed.message(), Some("Failed to sign report"));

    let deleted = reports_delete(&state, ReportKind::EndOfTerm, "any".into()).await;
    assert_eq!(deleted.message(), Some("Failed to delete report"));
    assert!(!deleted.success);

    let exported = reports_export(&state, ReportKind::Weekly, "any".into()).await;
    assert_eq!(exported.message(), Some("Failed to export report"));

    // The raw driver message never reaches the response.
    let json = serde_json::to_string(&listed).unwrap();
    assert!(!json.contains("locked"));
    assert_eq!(store.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_validation_happens_before_store_access() {
    let store = Arc::new(UnavailableStore::new());
    let state = AppState::with_store(quiet_config(), store.clone());

    let mut payload = weekly_payload();
    if let ReportPayload::Weekly(input) = &mut payload {
        input.student_name = "   ".to_string();
    }
    let response = reports_create(&state, payload).await;
    assert_eq!(response.code.as_deref(), Some(VALIDATION_ERROR));

    let signed = reports_sign(&state, ReportKind::EndOfTerm, "any".into(), None).await;
    assert_eq!(signed.code.as_deref(), Some(VALIDATION_ERROR));

    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_panic_in_blocking_task_is_reported() {
    let state = AppState::with_store(quiet_config(), Arc::new(PanickingStore));

    let listed = reports_list(&state, ReportKind::Weekly).await;
    assert!(!listed.success);
    assert_eq!(listed.code.as_deref(), Some(PERSISTENCE_ERROR));
    assert_eq!(listed.message(), Some("Failed to fetch reports"));
}

#[test]
fn test_duplicate_insert_is_a_conflict() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("conflict.sqlite")).expect("db pool");
    let store = Arc::new(SqliteReportStore::new(pool));
    let service = ReportService::new(store.clone(), ListingCache::disabled(), ReportEventBus::new());

    let created = service.create(weekly_payload()).expect("create");
    let record = created.as_weekly().expect("weekly record").clone();

    let result = store.insert_weekly(&record);
    assert!(matches!(result, Err(AppError::Conflict { .. })));

    // The failed insert left the original aggregate intact.
    let stored = store.find_weekly(&record.id).unwrap().expect("stored report");
    assert_eq!(stored, record);
    assert_eq!(store.list_weekly().unwrap().len(), 1);
}

#[test]
fn test_failed_store_write_publishes_nothing() {
    let service = ReportService::new(
        Arc::new(UnavailableStore::new()),
        ListingCache::new(30),
        ReportEventBus::new(),
    );
    let mut receiver = service.events().subscribe();

    assert!(service.create(weekly_payload()).is_err());
    assert!(service.delete(ReportKind::Weekly, "any").is_err());
    assert!(receiver.try_recv().is_err());
}
