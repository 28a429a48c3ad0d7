// Lifecycle properties of both report kinds against a real SQLite store.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Utc};
use internship_reports_lib::db::{DbPool, ReportStore, SqliteReportStore};
use internship_reports_lib::error::{AppError, AppResult};
use internship_reports_lib::models::end_of_term_report::{
    EndOfTermReportCreateInput, EndOfTermReportRecord, ScoreItemInput, RUBRIC_QUESTIONS,
};
use internship_reports_lib::models::report::{Report, ReportKind, ReportPayload, ReportState};
use internship_reports_lib::models::weekly_report::{
    WeeklyReportCreateInput, WeeklyReportRecord, WeeklyTaskInput,
};
use internship_reports_lib::services::listing_cache::ListingCache;
use internship_reports_lib::services::report_events::ReportEventBus;
use internship_reports_lib::services::report_service::ReportService;
use tempfile::tempdir;

fn setup_service(cache_ttl: u64) -> (ReportService, DbPool, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("lifecycle.sqlite");
    let pool = DbPool::new(db_path).expect("db pool");
    let service = ReportService::new(
        Arc::new(SqliteReportStore::new(pool.clone())),
        ListingCache::new(cache_ttl),
        ReportEventBus::new(),
    );
    (service, pool, dir)
}

/// SQLite store that can hold a weekly listing between the read and the
/// return, and can fail every lookup by id.
struct InterleavingStore {
    inner: SqliteReportStore,
    hold_listing: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    lookups_fail: bool,
}

impl InterleavingStore {
    fn new(pool: DbPool) -> Self {
        Self {
            inner: SqliteReportStore::new(pool),
            hold_listing: Mutex::new(None),
            lookups_fail: false,
        }
    }

    /// The next weekly listing reports on `read_done` and then waits on `resume`.
    fn hold_next_listing(&self, read_done: Sender<()>, resume: Receiver<()>) {
        *self.hold_listing.lock().unwrap() = Some((read_done, resume));
    }

    fn lookup<T>(&self, found: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        if self.lookups_fail {
            return Err(AppError::database("lookup unavailable"));
        }
        found()
    }
}

impl ReportStore for InterleavingStore {
    fn insert_weekly(&self, record: &WeeklyReportRecord) -> AppResult<()> {
        self.inner.insert_weekly(record)
    }
    fn list_weekly(&self) -> AppResult<Vec<WeeklyReportRecord>> {
        let listed = self.inner.list_weekly();
        let hold = self.hold_listing.lock().unwrap().take();
        if let Some((read_done, resume)) = hold {
            read_done.send(()).unwrap();
            resume.recv().unwrap();
        }
        listed
    }
    fn find_weekly(&self, id: &str) -> AppResult<Option<WeeklyReportRecord>> {
        self.lookup(|| self.inner.find_weekly(id))
    }
    fn mark_weekly_signed(&self, id: &str) -> AppResult<WeeklyReportRecord> {
        self.inner.mark_weekly_signed(id)
    }
    fn delete_weekly(&self, id: &str) -> AppResult<()> {
        self.inner.delete_weekly(id)
    }
    fn insert_end_of_term(&self, record: &EndOfTermReportRecord) -> AppResult<()> {
        self.inner.insert_end_of_term(record)
    }
    fn list_end_of_term(&self) -> AppResult<Vec<EndOfTermReportRecord>> {
        self.inner.list_end_of_term()
    }
    fn find_end_of_term(&self, id: &str) -> AppResult<Option<EndOfTermReportRecord>> {
        self.lookup(|| self.inner.find_end_of_term(id))
    }
    fn sign_end_of_term(
        &self,
        id: &str,
        signature: &str,
        signed_at: &str,
    ) -> AppResult<EndOfTermReportRecord> {
        self.inner.sign_end_of_term(id, signature, signed_at)
    }
    fn delete_end_of_term(&self, id: &str) -> AppResult<()> {
        self.inner.delete_end_of_term(id)
    }
}

fn weekly_input(week: i64, tasks: Vec<WeeklyTaskInput>, total_hours: f64) -> WeeklyReportCreateInput {
    WeeklyReportCreateInput {
        student_name: "Grace Hopper".to_string(),
        student_id: 104_233,
        organisation: "Eckert-Mauchly".to_string(),
        industry_supervisor: "Howard Aiken".to_string(),
        date_prepared: "2025-03-07".to_string(),
        week_number: week,
        tasks,
        plans_for_next_week: "Write the compiler".to_string(),
        total_hours,
    }
}

fn task(day: i64, hours: f64) -> WeeklyTaskInput {
    WeeklyTaskInput {
        day,
        date: format!("2025-03-0{day}"),
        description: format!("Work on day {day}"),
        hours_spent: hours,
    }
}

fn end_of_term_input(scores: &[i64]) -> EndOfTermReportCreateInput {
    EndOfTermReportCreateInput {
        student_name: "Grace Hopper".to_string(),
        student_id: 104_233,
        organisation: "Eckert-Mauchly".to_string(),
        industry_supervisor: "Howard Aiken".to_string(),
        date_of_submit: "2025-06-01".to_string(),
        score_items: RUBRIC_QUESTIONS
            .iter()
            .zip(scores)
            .map(|(question, score)| ScoreItemInput::new(*question, *score))
            .collect(),
        student_comments: "Enjoyed the work".to_string(),
        supervisor_comments: "Great progress".to_string(),
        student_signature: "G. Hopper".to_string(),
        student_signature_date: "2025-05-30".to_string(),
    }
}

#[test]
fn test_weekly_total_hours_stored_as_submitted() {
    let (service, _pool, _dir) = setup_service(30);

    let tasks = vec![task(1, 8.0), task(2, 8.0), task(3, 8.0), task(4, 8.0), task(5, 8.0)];
    let created = service
        .create(ReportPayload::Weekly(weekly_input(3, tasks, 40.0)))
        .expect("create weekly");

    let weekly = created.as_weekly().expect("weekly record");
    assert_eq!(weekly.tasks.len(), 5);
    assert_eq!(weekly.total_hours, 40.0);
    assert!(!weekly.is_signed);

    // Declared total differs from the task sum and is still kept verbatim.
    let created = service
        .create(ReportPayload::Weekly(weekly_input(4, vec![task(1, 2.0)], 5.0)))
        .expect("create weekly");
    let fetched = service.get(ReportKind::Weekly, created.id()).expect("get weekly");
    assert_eq!(fetched.as_weekly().unwrap().total_hours, 5.0);
}

#[test]
fn test_weekly_without_tasks_is_rejected() {
    let (service, pool, _dir) = setup_service(30);

    let result = service.create(ReportPayload::Weekly(weekly_input(2, Vec::new(), 0.0)));
    match result {
        Err(AppError::Validation { field_errors, .. }) => {
            assert_eq!(
                field_errors.get("tasks"),
                Some(&["At least one task is required".to_string()][..])
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let count: i64 = pool
        .with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM weekly_reports", [], |row| row.get(0))?)
        })
        .expect("count");
    assert_eq!(count, 0);
}

#[test]
fn test_end_of_term_score_validation() {
    let (service, _pool, _dir) = setup_service(30);

    let four_items = end_of_term_input(&[3, 3, 3, 3]);
    let result = service.create(ReportPayload::EndOfTerm(four_items));
    match result {
        Err(AppError::Validation { field_errors, .. }) => {
            assert!(field_errors.contains("scoreItems"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let out_of_range = end_of_term_input(&[3, 3, 6, 3, 3]);
    match service.create(ReportPayload::EndOfTerm(out_of_range)) {
        Err(AppError::Validation { field_errors, .. }) => {
            assert!(field_errors.contains("scoreItems[2].score"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let zero = end_of_term_input(&[0, 3, 3, 3, 3]);
    assert!(matches!(
        service.create(ReportPayload::EndOfTerm(zero)),
        Err(AppError::Validation { .. })
    ));

    assert!(service.list(ReportKind::EndOfTerm).unwrap().is_empty());
}

#[test]
fn test_end_of_term_items_keep_submitted_order() {
    let (service, _pool, _dir) = setup_service(30);

    let mut input = end_of_term_input(&[1, 2, 3, 4, 5]);
    input.score_items.reverse();
    let created = service
        .create(ReportPayload::EndOfTerm(input))
        .expect("create end of term");

    let record = created.as_end_of_term().unwrap();
    assert_eq!(record.score_items[0].question, RUBRIC_QUESTIONS[4]);
    assert_eq!(record.score_for(RUBRIC_QUESTIONS[0]), Some(1));
    assert_eq!(record.score_for(RUBRIC_QUESTIONS[4]), Some(5));
    assert!(record.supervisor_signature.is_none());
    assert_eq!(created.state(), ReportState::Created);
}

#[test]
fn test_weekly_sign_is_idempotent() {
    let (service, _pool, _dir) = setup_service(30);
    let created = service
        .create(ReportPayload::Weekly(weekly_input(5, vec![task(1, 4.0)], 4.0)))
        .unwrap();

    let first = service.sign(ReportKind::Weekly, created.id(), None).expect("first sign");
    let second = service
        .sign(ReportKind::Weekly, created.id(), Some("ignored"))
        .expect("second sign");

    assert!(first.as_weekly().unwrap().is_signed);
    assert!(second.as_weekly().unwrap().is_signed);
    assert_eq!(second.state(), ReportState::Signed);
}

#[test]
fn test_end_of_term_sign_records_call_time() {
    let (service, _pool, _dir) = setup_service(30);
    let created = service
        .create(ReportPayload::EndOfTerm(end_of_term_input(&[2, 3, 4, 5, 1])))
        .unwrap();

    let before = Utc::now();
    let signed = service
        .sign(ReportKind::EndOfTerm, created.id(), Some("  Alice  "))
        .expect("sign");
    let after = Utc::now();

    let record = signed.as_end_of_term().unwrap();
    assert_eq!(record.supervisor_signature.as_deref(), Some("Alice"));
    let signed_at = DateTime::parse_from_rfc3339(record.supervisor_signature_date.as_deref().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert!(signed_at >= before && signed_at <= after);
    assert_eq!(record.student_signature_date, "2025-05-30");

    // A second signature replaces the first.
    let resigned = service
        .sign(ReportKind::EndOfTerm, created.id(), Some("Bob"))
        .expect("re-sign");
    assert_eq!(
        resigned.as_end_of_term().unwrap().supervisor_signature.as_deref(),
        Some("Bob")
    );
}

#[test]
fn test_sign_missing_report_is_not_found() {
    let (service, _pool, _dir) = setup_service(30);
    assert!(matches!(
        service.sign(ReportKind::Weekly, "missing", None),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        service.sign(ReportKind::EndOfTerm, "missing", Some("Alice")),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_delete_removes_report_and_children() {
    let (service, pool, _dir) = setup_service(30);
    let keep = service
        .create(ReportPayload::Weekly(weekly_input(1, vec![task(1, 1.0)], 1.0)))
        .unwrap();
    let removed = service
        .create(ReportPayload::Weekly(weekly_input(2, vec![task(1, 1.0), task(2, 2.0)], 3.0)))
        .unwrap();
    assert_eq!(service.list(ReportKind::Weekly).unwrap().len(), 2);

    service.delete(ReportKind::Weekly, removed.id()).expect("delete");

    let ids: Vec<String> = service
        .list(ReportKind::Weekly)
        .unwrap()
        .iter()
        .map(|report| report.id().to_string())
        .collect();
    assert_eq!(ids, vec![keep.id().to_string()]);

    let orphaned: i64 = pool
        .with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM weekly_report_tasks WHERE report_id = ?1",
                [removed.id()],
                |row| row.get(0),
            )?)
        })
        .unwrap();
    assert_eq!(orphaned, 0);

    assert!(matches!(
        service.delete(ReportKind::Weekly, removed.id()),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_list_is_newest_first() {
    let (service, _pool, _dir) = setup_service(0);

    let ids: Vec<String> = (1..=4)
        .map(|week| {
            service
                .create(ReportPayload::Weekly(weekly_input(week, vec![task(1, 1.0)], 1.0)))
                .unwrap()
                .id()
                .to_string()
        })
        .collect();

    let listed: Vec<Report> = service.list(ReportKind::Weekly).unwrap();
    let listed_ids: Vec<&str> = listed.iter().map(Report::id).collect();
    let expected: Vec<&str> = ids.iter().rev().map(String::as_str).collect();
    assert_eq!(listed_ids, expected);

    let created_at: Vec<&str> = listed.iter().map(Report::created_at).collect();
    let mut sorted = created_at.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(created_at, sorted);
}

#[test]
fn test_kinds_are_listed_separately() {
    let (service, _pool, _dir) = setup_service(30);
    service
        .create(ReportPayload::Weekly(weekly_input(1, vec![task(1, 1.0)], 1.0)))
        .unwrap();
    service
        .create(ReportPayload::EndOfTerm(end_of_term_input(&[1, 1, 1, 1, 1])))
        .unwrap();

    let weekly = service.list(ReportKind::Weekly).unwrap();
    let end_of_term = service.list(ReportKind::EndOfTerm).unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!(end_of_term.len(), 1);
    assert_eq!(weekly[0].kind(), ReportKind::Weekly);
    assert_eq!(end_of_term[0].kind(), ReportKind::EndOfTerm);
    assert!(matches!(
        service.get(ReportKind::Weekly, end_of_term[0].id()),
        Err(AppError::NotFound)
    ));
}

#[test]
fn test_listing_read_during_delete_is_not_cached() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("interleaved.sqlite")).expect("db pool");
    let store = Arc::new(InterleavingStore::new(pool));
    let service = Arc::new(ReportService::new(
        store.clone(),
        ListingCache::new(60),
        ReportEventBus::new(),
    ));
    let created = service
        .create(ReportPayload::Weekly(weekly_input(6, vec![task(1, 3.0)], 3.0)))
        .unwrap();

    let (read_done_tx, read_done_rx) = channel();
    let (resume_tx, resume_rx) = channel();
    store.hold_next_listing(read_done_tx, resume_rx);

    let reader = {
        let service = service.clone();
        thread::spawn(move || service.list(ReportKind::Weekly))
    };
    read_done_rx.recv().expect("listing read");

    service.delete(ReportKind::Weekly, created.id()).expect("delete");
    resume_tx.send(()).unwrap();

    // The in-flight read started before the delete and may still see it.
    let in_flight = reader.join().unwrap().expect("in-flight listing");
    assert_eq!(in_flight.len(), 1);

    let listed = service.list(ReportKind::Weekly).expect("list after delete");
    assert!(listed.iter().all(|report| report.id() != created.id()));
}

#[test]
fn test_sign_returns_committed_report_without_a_second_read() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("sign.sqlite")).expect("db pool");
    let seeding = ReportService::new(
        Arc::new(SqliteReportStore::new(pool.clone())),
        ListingCache::disabled(),
        ReportEventBus::new(),
    );
    let weekly = seeding
        .create(ReportPayload::Weekly(weekly_input(7, vec![task(1, 2.0)], 2.0)))
        .unwrap();
    let end_of_term = seeding
        .create(ReportPayload::EndOfTerm(end_of_term_input(&[3, 3, 3, 3, 3])))
        .unwrap();

    let store = InterleavingStore {
        lookups_fail: true,
        ..InterleavingStore::new(pool)
    };
    let service = ReportService::new(Arc::new(store), ListingCache::disabled(), ReportEventBus::new());

    let signed = service
        .sign(ReportKind::Weekly, weekly.id(), None)
        .expect("weekly sign");
    assert!(signed.as_weekly().unwrap().is_signed);
    assert_eq!(signed.as_weekly().unwrap().tasks.len(), 1);

    let signed = service
        .sign(ReportKind::EndOfTerm, end_of_term.id(), Some("Howard Aiken"))
        .expect("end of term sign");
    let record = signed.as_end_of_term().unwrap();
    assert_eq!(record.supervisor_signature.as_deref(), Some("Howard Aiken"));
    assert_eq!(record.score_items.len(), 5);
}
