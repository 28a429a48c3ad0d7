//! Field-level payload validation.
//!
//! Everything here is a pure function of its input. The draft reducers and
//! `ReportService::create` call the same functions, so a payload that passes
//! on the client passes on the server and vice versa.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};

use crate::error::FieldErrors;
use crate::models::end_of_term_report::{
    rubric_position, EndOfTermReportCreateInput, MAX_SCORE, MIN_SCORE, RUBRIC_QUESTIONS,
};
use crate::models::report::ReportPayload;
use crate::models::weekly_report::WeeklyReportCreateInput;

pub const MIN_WEEK: i64 = 1;
pub const MAX_WEEK: i64 = 12;
pub const MIN_DAY: i64 = 1;
pub const MAX_DAY: i64 = 7;
pub const MIN_TASK_HOURS: f64 = 0.5;
pub const MAX_TASK_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeeklyField {
    StudentName,
    StudentId,
    Organisation,
    IndustrySupervisor,
    DatePrepared,
    WeekNumber,
    Tasks,
    PlansForNextWeek,
    TotalHours,
}

impl WeeklyField {
    pub fn as_str(self) -> &'static str {
        match self {
            WeeklyField::StudentName => "studentName",
            WeeklyField::StudentId => "studentId",
            WeeklyField::Organisation => "organisation",
            WeeklyField::IndustrySupervisor => "industrySupervisor",
            WeeklyField::DatePrepared => "datePrepared",
            WeeklyField::WeekNumber => "weekNumber",
            WeeklyField::Tasks => "tasks",
            WeeklyField::PlansForNextWeek => "plansForNextWeek",
            WeeklyField::TotalHours => "totalHours",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Day,
    Date,
    Description,
    HoursSpent,
}

impl TaskField {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskField::Day => "day",
            TaskField::Date => "date",
            TaskField::Description => "description",
            TaskField::HoursSpent => "hoursSpent",
        }
    }

    pub fn key(self, index: usize) -> String {
        format!("{}[{index}].{}", WeeklyField::Tasks.as_str(), self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndOfTermField {
    StudentName,
    StudentId,
    Organisation,
    IndustrySupervisor,
    DateOfSubmit,
    ScoreItems,
    StudentComments,
    SupervisorComments,
    StudentSignature,
    StudentSignatureDate,
    SupervisorSignature,
}

impl EndOfTermField {
    pub fn as_str(self) -> &'static str {
        match self {
            EndOfTermField::StudentName => "studentName",
            EndOfTermField::StudentId => "studentId",
            EndOfTermField::Organisation => "organisation",
            EndOfTermField::IndustrySupervisor => "industrySupervisor",
            EndOfTermField::DateOfSubmit => "dateOfSubmit",
            EndOfTermField::ScoreItems => "scoreItems",
            EndOfTermField::StudentComments => "studentComments",
            EndOfTermField::SupervisorComments => "supervisorComments",
            EndOfTermField::StudentSignature => "studentSignature",
            EndOfTermField::StudentSignatureDate => "studentSignatureDate",
            EndOfTermField::SupervisorSignature => "supervisorSignature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Question,
    Score,
}

impl ScoreField {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreField::Question => "question",
            ScoreField::Score => "score",
        }
    }

    pub fn key(self, index: usize) -> String {
        format!(
            "{}[{index}].{}",
            EndOfTermField::ScoreItems.as_str(),
            self.as_str()
        )
    }
}

pub fn validate_payload(payload: &ReportPayload) -> Result<(), FieldErrors> {
    match payload {
        ReportPayload::Weekly(input) => validate_weekly(input),
        ReportPayload::EndOfTerm(input) => validate_end_of_term(input),
    }
}

pub fn validate_weekly(input: &WeeklyReportCreateInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    require_text(
        &mut errors,
        WeeklyField::StudentName.as_str(),
        &input.student_name,
        "Student name is required",
    );
    check_student_id(&mut errors, WeeklyField::StudentId.as_str(), input.student_id);
    require_text(
        &mut errors,
        WeeklyField::Organisation.as_str(),
        &input.organisation,
        "Organisation is required",
    );
    require_text(
        &mut errors,
        WeeklyField::IndustrySupervisor.as_str(),
        &input.industry_supervisor,
        "Industry supervisor is required",
    );
    require_date(
        &mut errors,
        WeeklyField::DatePrepared.as_str(),
        &input.date_prepared,
        "Date prepared",
    );

    if !(MIN_WEEK..=MAX_WEEK).contains(&input.week_number) {
        errors.add(
            WeeklyField::WeekNumber.as_str(),
            format!("Week number must be between {MIN_WEEK} and {MAX_WEEK}"),
        );
    }

    if input.tasks.is_empty() {
        errors.add(WeeklyField::Tasks.as_str(), "At least one task is required");
    }

    for (index, task) in input.tasks.iter().enumerate() {
        if !(MIN_DAY..=MAX_DAY).contains(&task.day) {
            errors.add(
                TaskField::Day.key(index),
                format!("Day must be between {MIN_DAY} and {MAX_DAY}"),
            );
        }
        require_date(&mut errors, &TaskField::Date.key(index), &task.date, "Task date");
        require_text(
            &mut errors,
            &TaskField::Description.key(index),
            &task.description,
            "Task description is required",
        );
        if !task_hours_in_range(task.hours_spent) {
            errors.add(
                TaskField::HoursSpent.key(index),
                "Hours spent must be between 0.5 and 24",
            );
        }
    }

    require_text(
        &mut errors,
        WeeklyField::PlansForNextWeek.as_str(),
        &input.plans_for_next_week,
        "Plans for next week are required",
    );

    if !input.total_hours.is_finite() || input.total_hours < 0.0 {
        errors.add(
            WeeklyField::TotalHours.as_str(),
            "Total hours must be a non-negative number",
        );
    }

    errors.into_result()
}

pub fn validate_end_of_term(input: &EndOfTermReportCreateInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    require_text(
        &mut errors,
        EndOfTermField::StudentName.as_str(),
        &input.student_name,
        "Student name is required",
    );
    check_student_id(&mut errors, EndOfTermField::StudentId.as_str(), input.student_id);
    require_text(
        &mut errors,
        EndOfTermField::Organisation.as_str(),
        &input.organisation,
        "Organisation is required",
    );
    require_text(
        &mut errors,
        EndOfTermField::IndustrySupervisor.as_str(),
        &input.industry_supervisor,
        "Industry supervisor is required",
    );
    require_date(
        &mut errors,
        EndOfTermField::DateOfSubmit.as_str(),
        &input.date_of_submit,
        "Date of submission",
    );

    check_score_items(&mut errors, input);

    require_text(
        &mut errors,
        EndOfTermField::StudentComments.as_str(),
        &input.student_comments,
        "Student comments are required",
    );
    require_text(
        &mut errors,
        EndOfTermField::SupervisorComments.as_str(),
        &input.supervisor_comments,
        "Supervisor comments are required",
    );
    require_text(
        &mut errors,
        EndOfTermField::StudentSignature.as_str(),
        &input.student_signature,
        "Student signature is required",
    );
    require_date(
        &mut errors,
        EndOfTermField::StudentSignatureDate.as_str(),
        &input.student_signature_date,
        "Student signature date",
    );

    errors.into_result()
}

/// Returns the trimmed signer identity for an end-of-term supervisor signature.
pub fn validate_signer(signer: Option<&str>) -> Result<String, FieldErrors> {
    match signer.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => {
            let mut errors = FieldErrors::new();
            errors.add(
                EndOfTermField::SupervisorSignature.as_str(),
                "Supervisor signature is required",
            );
            Err(errors)
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

pub fn task_hours_in_range(hours: f64) -> bool {
    hours.is_finite() && (MIN_TASK_HOURS..=MAX_TASK_HOURS).contains(&hours)
}

fn check_score_items(errors: &mut FieldErrors, input: &EndOfTermReportCreateInput) {
    let field = EndOfTermField::ScoreItems.as_str();

    if input.score_items.len() != RUBRIC_QUESTIONS.len() {
        errors.add(
            field,
            format!(
                "Exactly {} score items are required",
                RUBRIC_QUESTIONS.len()
            ),
        );
    }

    let mut seen = HashSet::new();
    for (index, item) in input.score_items.iter().enumerate() {
        if item.question.trim().is_empty() {
            errors.add(ScoreField::Question.key(index), "Question is required");
        } else {
            match rubric_position(&item.question) {
                Some(position) => {
                    if !seen.insert(position) {
                        errors.add(
                            ScoreField::Question.key(index),
                            "Question is answered more than once",
                        );
                    }
                }
                None => errors.add(
                    ScoreField::Question.key(index),
                    "Question is not part of the rubric",
                ),
            }
        }

        if !(MIN_SCORE..=MAX_SCORE).contains(&item.score) {
            errors.add(
                ScoreField::Score.key(index),
                format!("Score must be between {MIN_SCORE} and {MAX_SCORE}"),
            );
        }
    }

    for (position, question) in RUBRIC_QUESTIONS.iter().enumerate() {
        if !seen.contains(&position) {
            errors.add(field, format!("Missing score for: {question}"));
        }
    }
}

fn require_text(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn check_student_id(errors: &mut FieldErrors, field: &str, value: i64) {
    if value <= 0 {
        errors.add(field, "Student ID must be a positive number");
    }
}

fn require_date(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if parse_report_date(value).is_none() {
        errors.add(field, format!("{label} must be a valid date"));
    }
}
