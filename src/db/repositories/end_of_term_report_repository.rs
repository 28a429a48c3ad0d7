use std::collections::HashMap;
use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::end_of_term_report::{EndOfTermReportRecord, ScoreItemRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        student_name,
        student_id,
        organisation,
        industry_supervisor,
        date_of_submit,
        student_comments,
        supervisor_comments,
        student_signature,
        student_signature_date,
        supervisor_signature,
        supervisor_signature_date,
        created_at
    FROM end_of_term_reports
"#;

const SCORE_SELECT: &str = r#"
    SELECT
        id,
        report_id,
        position,
        question,
        score
    FROM end_of_term_score_items
"#;

#[derive(Debug, Clone)]
pub struct EndOfTermReportRow {
    pub id: String,
    pub student_name: String,
    pub student_id: i64,
    pub organisation: String,
    pub industry_supervisor: String,
    pub date_of_submit: String,
    pub student_comments: String,
    pub supervisor_comments: String,
    pub student_signature: String,
    pub student_signature_date: String,
    pub supervisor_signature: Option<String>,
    pub supervisor_signature_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ScoreItemRow {
    pub id: String,
    pub report_id: String,
    pub position: i64,
    pub question: String,
    pub score: i64,
}

impl EndOfTermReportRow {
    pub fn from_record(record: &EndOfTermReportRecord) -> (Self, Vec<ScoreItemRow>) {
        let report = Self {
            id: record.id.clone(),
            student_name: record.student_name.clone(),
            student_id: record.student_id,
            organisation: record.organisation.clone(),
            industry_supervisor: record.industry_supervisor.clone(),
            date_of_submit: record.date_of_submit.clone(),
            student_comments: record.student_comments.clone(),
            supervisor_comments: record.supervisor_comments.clone(),
            student_signature: record.student_signature.clone(),
            student_signature_date: record.student_signature_date.clone(),
            supervisor_signature: record.supervisor_signature.clone(),
            supervisor_signature_date: record.supervisor_signature_date.clone(),
            created_at: record.created_at.clone(),
        };

        let items = record
            .score_items
            .iter()
            .enumerate()
            .map(|(position, item)| ScoreItemRow {
                id: item.id.clone(),
                report_id: record.id.clone(),
                position: position as i64,
                question: item.question.clone(),
                score: item.score,
            })
            .collect();

        (report, items)
    }

    pub fn into_record(self, items: Vec<ScoreItemRow>) -> EndOfTermReportRecord {
        EndOfTermReportRecord {
            id: self.id,
            student_name: self.student_name,
            student_id: self.student_id,
            organisation: self.organisation,
            industry_supervisor: self.industry_supervisor,
            date_of_submit: self.date_of_submit,
            score_items: items
                .into_iter()
                .map(|item| ScoreItemRecord {
                    id: item.id,
                    question: item.question,
                    score: item.score,
                })
                .collect(),
            student_comments: self.student_comments,
            supervisor_comments: self.supervisor_comments,
            student_signature: self.student_signature,
            student_signature_date: self.student_signature_date,
            supervisor_signature: self.supervisor_signature,
            supervisor_signature_date: self.supervisor_signature_date,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for EndOfTermReportRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(EndOfTermReportRow {
            id: row.get("id")?,
            student_name: row.get("student_name")?,
            student_id: row.get("student_id")?,
            organisation: row.get("organisation")?,
            industry_supervisor: row.get("industry_supervisor")?,
            date_of_submit: row.get("date_of_submit")?,
            student_comments: row.get("student_comments")?,
            supervisor_comments: row.get("supervisor_comments")?,
            student_signature: row.get("student_signature")?,
            student_signature_date: row.get("student_signature_date")?,
            supervisor_signature: row.get("supervisor_signature")?,
            supervisor_signature_date: row.get("supervisor_signature_date")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl TryFrom<&Row<'_>> for ScoreItemRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(ScoreItemRow {
            id: row.get("id")?,
            report_id: row.get("report_id")?,
            position: row.get("position")?,
            question: row.get("question")?,
            score: row.get("score")?,
        })
    }
}

pub struct EndOfTermReportRepository;

impl EndOfTermReportRepository {
    /// Inserts the report and its score items. Callers provide the transaction.
    pub fn insert(
        conn: &Connection,
        report: &EndOfTermReportRow,
        items: &[ScoreItemRow],
    ) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO end_of_term_reports (
                    id,
                    student_name,
                    student_id,
                    organisation,
                    industry_supervisor,
                    date_of_submit,
                    student_comments,
                    supervisor_comments,
                    student_signature,
                    student_signature_date,
                    supervisor_signature,
                    supervisor_signature_date,
                    created_at
                ) VALUES (
                    :id,
                    :student_name,
                    :student_id,
                    :organisation,
                    :industry_supervisor,
                    :date_of_submit,
                    :student_comments,
                    :supervisor_comments,
                    :student_signature,
                    :student_signature_date,
                    :supervisor_signature,
                    :supervisor_signature_date,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &report.id,
                ":student_name": &report.student_name,
                ":student_id": &report.student_id,
                ":organisation": &report.organisation,
                ":industry_supervisor": &report.industry_supervisor,
                ":date_of_submit": &report.date_of_submit,
                ":student_comments": &report.student_comments,
                ":supervisor_comments": &report.supervisor_comments,
                ":student_signature": &report.student_signature,
                ":student_signature_date": &report.student_signature_date,
                ":supervisor_signature": &report.supervisor_signature,
                ":supervisor_signature_date": &report.supervisor_signature_date,
                ":created_at": &report.created_at,
            },
        )?;

        let mut stmt = conn.prepare(
            r#"
                INSERT INTO end_of_term_score_items (
                    id, report_id, position, question, score
                ) VALUES (
                    :id, :report_id, :position, :question, :score
                )
            "#,
        )?;
        for item in items {
            stmt.execute(named_params! {
                ":id": &item.id,
                ":report_id": &item.report_id,
                ":position": &item.position,
                ":question": &item.question,
                ":score": &item.score,
            })?;
        }

        Ok(())
    }

    pub fn set_supervisor_signature(
        conn: &Connection,
        id: &str,
        signature: &str,
        signed_at: &str,
    ) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE end_of_term_reports SET
                    supervisor_signature = :signature,
                    supervisor_signature_date = :signed_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": id,
                ":signature": signature,
                ":signed_at": signed_at,
            },
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Score items go with the report through `ON DELETE CASCADE`.
    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM end_of_term_reports WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<EndOfTermReportRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([id], |row| EndOfTermReportRow::try_from(row))
            .optional()?;

        match row {
            Some(report) => {
                let items = Self::items_for(conn, &report.id)?;
                Ok(Some(report.into_record(items)))
            }
            None => Ok(None),
        }
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<EndOfTermReportRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            BASE_SELECT
        ))?;
        let rows = stmt
            .query_map([], |row| EndOfTermReportRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items_by_report = Self::all_items(conn)?;
        let records = rows
            .into_iter()
            .map(|report| {
                let items = items_by_report.remove(&report.id).unwrap_or_default();
                report.into_record(items)
            })
            .collect();
        Ok(records)
    }

    fn items_for(conn: &Connection, report_id: &str) -> AppResult<Vec<ScoreItemRow>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE report_id = ?1 ORDER BY position",
            SCORE_SELECT
        ))?;
        let items = stmt
            .query_map([report_id], |row| ScoreItemRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn all_items(conn: &Connection) -> AppResult<HashMap<String, Vec<ScoreItemRow>>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY report_id, position", SCORE_SELECT))?;
        let rows = stmt
            .query_map([], |row| ScoreItemRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: HashMap<String, Vec<ScoreItemRow>> = HashMap::new();
        for item in rows {
            grouped.entry(item.report_id.clone()).or_default().push(item);
        }
        Ok(grouped)
    }
}
