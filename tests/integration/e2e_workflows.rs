// End-to-end: form draft → command → manage board → sign → export → delete.

use chrono::NaiveDate;
use internship_reports_lib::bootstrap;
use internship_reports_lib::commands::reports::{
    reports_create, reports_delete, reports_export, reports_list, reports_sign,
};
use internship_reports_lib::config::AppConfig;
use internship_reports_lib::models::report::{ReportKind, ReportState};
use internship_reports_lib::services::report_board::ReportBoard;
use internship_reports_lib::services::report_draft::{
    EndOfTermDraftAction, EndOfTermReportDraft, WeeklyDraftAction, WeeklyReportDraft,
};
use internship_reports_lib::services::validation::{EndOfTermField, TaskField, WeeklyField};
use tempfile::tempdir;

fn test_config(dir: &tempfile::TempDir) -> AppConfig {
    let mut config = AppConfig::from_yaml(
        "logDir: ~\nlogDirectives: warn\nlistingCacheTtlSeconds: 5\n",
    )
    .expect("yaml config");
    config.database_path = dir.path().join("nested").join("reports.sqlite");
    config
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 11).expect("valid date")
}

fn weekly_draft(week: i64) -> WeeklyReportDraft {
    WeeklyReportDraft::new(today())
        .apply(WeeklyDraftAction::SetText(WeeklyField::StudentName, "Barbara Liskov".into()))
        .apply(WeeklyDraftAction::SetStudentId(197_401))
        .apply(WeeklyDraftAction::SetText(WeeklyField::Organisation, "MIT LCS".into()))
        .apply(WeeklyDraftAction::SetText(
            WeeklyField::IndustrySupervisor,
            "John Guttag".into(),
        ))
        .apply(WeeklyDraftAction::SetWeekNumber(week))
        .apply(WeeklyDraftAction::SetTaskText(0, TaskField::Description, "CLU type checker".into()))
        .apply(WeeklyDraftAction::SetTaskHours(0, 6.0))
        .apply(WeeklyDraftAction::AddTask)
        .apply(WeeklyDraftAction::SetTaskDay(1, 2))
        .apply(WeeklyDraftAction::SetTaskText(1, TaskField::Description, "Iterator design".into()))
        .apply(WeeklyDraftAction::SetTaskHours(1, 4.5))
        .apply(WeeklyDraftAction::SetText(
            WeeklyField::PlansForNextWeek,
            "Exception handling semantics".into(),
        ))
}

#[tokio::test]
async fn test_complete_report_workflow() {
    let dir = tempdir().expect("temp dir");
    let config = test_config(&dir);
    let state = bootstrap(&config).expect("bootstrap");
    assert!(config.database_path.exists());

    let mut board = ReportBoard::load(state.reports()).expect("board");
    assert!(board.reports(ReportKind::Weekly).is_empty());

    // A draft that is not ready keeps its errors on the form.
    let incomplete = WeeklyReportDraft::new(today()).validate();
    assert!(incomplete.errors().contains("studentName"));
    assert!(incomplete.submission().is_err());

    let draft = weekly_draft(9);
    assert_eq!(draft.total_hours(), 10.5);
    let payload = draft.submission().expect("weekly submission");

    let created = reports_create(&state, payload).await;
    assert!(created.success);
    let weekly = created.data.expect("weekly report");
    assert_eq!(weekly.as_weekly().unwrap().total_hours, 10.5);

    let reloaded = board.sync().expect("sync");
    assert_eq!(reloaded, vec![ReportKind::Weekly]);
    assert_eq!(board.reports(ReportKind::Weekly).len(), 1);

    let signed = board
        .sign(ReportKind::Weekly, weekly.id(), None)
        .expect("board sign");
    assert_eq!(signed.state(), ReportState::Signed);
    assert_eq!(board.reports(ReportKind::Weekly)[0].state(), ReportState::Signed);

    let exported = reports_export(&state, ReportKind::Weekly, weekly.id().to_string()).await;
    assert_eq!(
        exported.data.expect("exported").file_name,
        "weekly-report-week-9.pdf"
    );

    let deleted = reports_delete(&state, ReportKind::Weekly, weekly.id().to_string()).await;
    assert!(deleted.success);
    board.sync().expect("sync after delete");
    assert!(board.reports(ReportKind::Weekly).is_empty());

    // Deleting from a stale board is still a success for the user.
    board
        .delete(ReportKind::Weekly, weekly.id())
        .expect("benign delete");
}

#[tokio::test]
async fn test_end_of_term_review_workflow() {
    let dir = tempdir().expect("temp dir");
    let state = bootstrap(&test_config(&dir)).expect("bootstrap");

    let draft = EndOfTermReportDraft::new(today())
        .apply(EndOfTermDraftAction::SetText(
            EndOfTermField::StudentName,
            "Barbara Liskov".into(),
        ))
        .apply(EndOfTermDraftAction::SetStudentId(197_401))
        .apply(EndOfTermDraftAction::SetText(EndOfTermField::Organisation, "MIT LCS".into()))
        .apply(EndOfTermDraftAction::SetText(
            EndOfTermField::IndustrySupervisor,
            "John Guttag".into(),
        ))
        .apply(EndOfTermDraftAction::SetScore(0, 5))
        .apply(EndOfTermDraftAction::SetScore(3, 4))
        .apply(EndOfTermDraftAction::SetText(
            EndOfTermField::StudentComments,
            "Data abstraction clicked".into(),
        ))
        .apply(EndOfTermDraftAction::SetText(
            EndOfTermField::SupervisorComments,
            "Ready for research".into(),
        ))
        .apply(EndOfTermDraftAction::SetText(
            EndOfTermField::StudentSignature,
            "B. Liskov".into(),
        ));

    let created = reports_create(&state, draft.submission().expect("submission")).await;
    let report = created.data.expect("end of term report");
    let id = report.id().to_string();
    assert_eq!(report.state(), ReportState::Created);

    let unsigned = reports_sign(&state, ReportKind::EndOfTerm, id.clone(), None).await;
    assert!(!unsigned.success);

    let signed = reports_sign(&state, ReportKind::EndOfTerm, id.clone(), Some("John Guttag".into())).await;
    assert_eq!(signed.data.expect("signed").state(), ReportState::Signed);

    let listed = reports_list(&state, ReportKind::EndOfTerm).await.data.expect("list");
    assert_eq!(listed.len(), 1);
    let record = listed[0].as_end_of_term().expect("end of term record");
    assert_eq!(record.score_items[0].score, 5);
    assert_eq!(record.score_items[3].score, 4);
    assert_eq!(record.supervisor_signature.as_deref(), Some("John Guttag"));

    let exported = reports_export(&state, ReportKind::EndOfTerm, id).await;
    assert_eq!(
        exported.data.expect("exported").file_name,
        "end-of-term-report-Barbara Liskov.pdf"
    );
}
