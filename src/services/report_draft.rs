//! Client-side form state for the two report kinds.
//!
//! A draft is a plain value. Every edit goes through `apply`, which returns
//! the next draft and clears the errors attached to the edited field. The
//! error map is only filled by `validate`/`submission`.

use chrono::NaiveDate;

use crate::error::FieldErrors;
use crate::models::end_of_term_report::{
    EndOfTermReportCreateInput, ScoreItemInput, MIN_SCORE, RUBRIC_QUESTIONS,
};
use crate::models::report::ReportPayload;
use crate::models::weekly_report::{WeeklyReportCreateInput, WeeklyTaskInput};
use crate::services::validation::{
    validate_end_of_term, validate_weekly, EndOfTermField, ScoreField, TaskField, WeeklyField,
    MIN_DAY,
};

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeeklyDraftAction {
    SetText(WeeklyField, String),
    SetStudentId(i64),
    SetWeekNumber(i64),
    AddTask,
    RemoveTask(usize),
    SetTaskDay(usize, i64),
    SetTaskText(usize, TaskField, String),
    SetTaskHours(usize, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyReportDraft {
    input: WeeklyReportCreateInput,
    errors: FieldErrors,
    today: NaiveDate,
}

impl WeeklyReportDraft {
    /// Starts with one blank task dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        let input = WeeklyReportCreateInput {
            date_prepared: date_text(today),
            tasks: vec![blank_task(today)],
            ..WeeklyReportCreateInput::default()
        };
        Self {
            input,
            errors: FieldErrors::new(),
            today,
        }
    }

    pub fn input(&self) -> &WeeklyReportCreateInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn total_hours(&self) -> f64 {
        self.input.task_hours()
    }

    pub fn apply(mut self, action: WeeklyDraftAction) -> Self {
        match action {
            WeeklyDraftAction::SetText(field, value) => {
                let slot = match field {
                    WeeklyField::StudentName => &mut self.input.student_name,
                    WeeklyField::Organisation => &mut self.input.organisation,
                    WeeklyField::IndustrySupervisor => &mut self.input.industry_supervisor,
                    WeeklyField::DatePrepared => &mut self.input.date_prepared,
                    WeeklyField::PlansForNextWeek => &mut self.input.plans_for_next_week,
                    // Not text fields.
                    WeeklyField::StudentId
                    | WeeklyField::WeekNumber
                    | WeeklyField::Tasks
                    | WeeklyField::TotalHours => return self,
                };
                *slot = value;
                self.errors.clear_field(field.as_str());
            }
            WeeklyDraftAction::SetStudentId(value) => {
                self.input.student_id = value;
                self.errors.clear_field(WeeklyField::StudentId.as_str());
            }
            WeeklyDraftAction::SetWeekNumber(value) => {
                self.input.week_number = value;
                self.errors.clear_field(WeeklyField::WeekNumber.as_str());
            }
            WeeklyDraftAction::AddTask => {
                self.input.tasks.push(blank_task(self.today));
                self.errors.clear_field(WeeklyField::Tasks.as_str());
            }
            WeeklyDraftAction::RemoveTask(index) => {
                if index < self.input.tasks.len() {
                    self.input.tasks.remove(index);
                    // Indexed keys shift, so the task errors no longer line up.
                    self.errors.clear_prefix(WeeklyField::Tasks.as_str());
                }
            }
            WeeklyDraftAction::SetTaskDay(index, day) => {
                if let Some(task) = self.input.tasks.get_mut(index) {
                    task.day = day;
                    self.errors.clear_field(&TaskField::Day.key(index));
                }
            }
            WeeklyDraftAction::SetTaskText(index, field, value) => {
                if let Some(task) = self.input.tasks.get_mut(index) {
                    match field {
                        TaskField::Date => task.date = value,
                        TaskField::Description => task.description = value,
                        TaskField::Day | TaskField::HoursSpent => return self,
                    }
                    self.errors.clear_field(&field.key(index));
                }
            }
            WeeklyDraftAction::SetTaskHours(index, hours) => {
                if let Some(task) = self.input.tasks.get_mut(index) {
                    task.hours_spent = hours;
                    self.errors.clear_field(&TaskField::HoursSpent.key(index));
                }
            }
        }
        self.input.total_hours = self.input.task_hours();
        self
    }

    pub fn validate(mut self) -> Self {
        self.input.total_hours = self.input.task_hours();
        self.errors = validate_weekly(&self.input).err().unwrap_or_default();
        self
    }

    pub fn submission(&self) -> Result<ReportPayload, FieldErrors> {
        let mut input = self.input.clone();
        input.total_hours = input.task_hours();
        validate_weekly(&input)?;
        Ok(ReportPayload::Weekly(input))
    }
}

fn blank_task(today: NaiveDate) -> WeeklyTaskInput {
    WeeklyTaskInput {
        day: MIN_DAY,
        date: date_text(today),
        description: String::new(),
        hours_spent: 0.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndOfTermDraftAction {
    SetText(EndOfTermField, String),
    SetStudentId(i64),
    SetScore(usize, i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndOfTermReportDraft {
    input: EndOfTermReportCreateInput,
    errors: FieldErrors,
}

impl EndOfTermReportDraft {
    /// One score item per rubric question, each at the lowest score.
    pub fn new(today: NaiveDate) -> Self {
        let input = EndOfTermReportCreateInput {
            date_of_submit: date_text(today),
            score_items: RUBRIC_QUESTIONS
                .iter()
                .map(|question| ScoreItemInput::new(*question, MIN_SCORE))
                .collect(),
            student_signature_date: date_text(today),
            ..EndOfTermReportCreateInput::default()
        };
        Self {
            input,
            errors: FieldErrors::new(),
        }
    }

    pub fn input(&self) -> &EndOfTermReportCreateInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn apply(mut self, action: EndOfTermDraftAction) -> Self {
        match action {
            EndOfTermDraftAction::SetText(field, value) => {
                let slot = match field {
                    EndOfTermField::StudentName => &mut self.input.student_name,
                    EndOfTermField::Organisation => &mut self.input.organisation,
                    EndOfTermField::IndustrySupervisor => &mut self.input.industry_supervisor,
                    EndOfTermField::DateOfSubmit => &mut self.input.date_of_submit,
                    EndOfTermField::StudentComments => &mut self.input.student_comments,
                    EndOfTermField::SupervisorComments => &mut self.input.supervisor_comments,
                    EndOfTermField::StudentSignature => &mut self.input.student_signature,
                    EndOfTermField::StudentSignatureDate => {
                        &mut self.input.student_signature_date
                    }
                    // The supervisor signs after submission, through `sign`.
                    EndOfTermField::StudentId
                    | EndOfTermField::ScoreItems
                    | EndOfTermField::SupervisorSignature => return self,
                };
                *slot = value;
                self.errors.clear_field(field.as_str());
            }
            EndOfTermDraftAction::SetStudentId(value) => {
                self.input.student_id = value;
                self.errors.clear_field(EndOfTermField::StudentId.as_str());
            }
            EndOfTermDraftAction::SetScore(index, score) => {
                if let Some(item) = self.input.score_items.get_mut(index) {
                    item.score = score;
                    self.errors.clear_field(&ScoreField::Score.key(index));
                    self.errors.clear_field(EndOfTermField::ScoreItems.as_str());
                }
            }
        }
        self
    }

    pub fn validate(mut self) -> Self {
        self.errors = validate_end_of_term(&self.input).err().unwrap_or_default();
        self
    }

    pub fn submission(&self) -> Result<ReportPayload, FieldErrors> {
        validate_end_of_term(&self.input)?;
        Ok(ReportPayload::EndOfTerm(self.input.clone()))
    }
}
