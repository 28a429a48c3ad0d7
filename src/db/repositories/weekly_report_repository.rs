use std::collections::HashMap;
use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::weekly_report::{WeeklyReportRecord, WeeklyTaskRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        student_name,
        student_id,
        organisation,
        industry_supervisor,
        date_prepared,
        week_number,
        plans_for_next_week,
        total_hours,
        is_signed,
        created_at
    FROM weekly_reports
"#;

const TASK_SELECT: &str = r#"
    SELECT
        id,
        report_id,
        position,
        day,
        date,
        description,
        hours_spent
    FROM weekly_report_tasks
"#;

#[derive(Debug, Clone)]
pub struct WeeklyReportRow {
    pub id: String,
    pub student_name: String,
    pub student_id: i64,
    pub organisation: String,
    pub industry_supervisor: String,
    pub date_prepared: String,
    pub week_number: i64,
    pub plans_for_next_week: String,
    pub total_hours: f64,
    pub is_signed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct WeeklyTaskRow {
    pub id: String,
    pub report_id: String,
    pub position: i64,
    pub day: i64,
    pub date: String,
    pub description: String,
    pub hours_spent: f64,
}

impl WeeklyReportRow {
    pub fn from_record(record: &WeeklyReportRecord) -> (Self, Vec<WeeklyTaskRow>) {
        let report = Self {
            id: record.id.clone(),
            student_name: record.student_name.clone(),
            student_id: record.student_id,
            organisation: record.organisation.clone(),
            industry_supervisor: record.industry_supervisor.clone(),
            date_prepared: record.date_prepared.clone(),
            week_number: record.week_number,
            plans_for_next_week: record.plans_for_next_week.clone(),
            total_hours: record.total_hours,
            is_signed: record.is_signed,
            created_at: record.created_at.clone(),
        };

        let tasks = record
            .tasks
            .iter()
            .enumerate()
            .map(|(position, task)| WeeklyTaskRow {
                id: task.id.clone(),
                report_id: record.id.clone(),
                position: position as i64,
                day: task.day,
                date: task.date.clone(),
                description: task.description.clone(),
                hours_spent: task.hours_spent,
            })
            .collect();

        (report, tasks)
    }

    pub fn into_record(self, tasks: Vec<WeeklyTaskRow>) -> WeeklyReportRecord {
        WeeklyReportRecord {
            id: self.id,
            student_name: self.student_name,
            student_id: self.student_id,
            organisation: self.organisation,
            industry_supervisor: self.industry_supervisor,
            date_prepared: self.date_prepared,
            week_number: self.week_number,
            tasks: tasks.into_iter().map(WeeklyTaskRow::into_record).collect(),
            plans_for_next_week: self.plans_for_next_week,
            total_hours: self.total_hours,
            is_signed: self.is_signed,
            created_at: self.created_at,
        }
    }
}

impl WeeklyTaskRow {
    fn into_record(self) -> WeeklyTaskRecord {
        WeeklyTaskRecord {
            id: self.id,
            day: self.day,
            date: self.date,
            description: self.description,
            hours_spent: self.hours_spent,
        }
    }
}

impl TryFrom<&Row<'_>> for WeeklyReportRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(WeeklyReportRow {
            id: row.get("id")?,
            student_name: row.get("student_name")?,
            student_id: row.get("student_id")?,
            organisation: row.get("organisation")?,
            industry_supervisor: row.get("industry_supervisor")?,
            date_prepared: row.get("date_prepared")?,
            week_number: row.get("week_number")?,
            plans_for_next_week: row.get("plans_for_next_week")?,
            total_hours: row.get("total_hours")?,
            is_signed: row.get::<_, i64>("is_signed")? != 0,
            created_at: row.get("created_at")?,
        })
    }
}

impl TryFrom<&Row<'_>> for WeeklyTaskRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(WeeklyTaskRow {
            id: row.get("id")?,
            report_id: row.get("report_id")?,
            position: row.get("position")?,
            day: row.get("day")?,
            date: row.get("date")?,
            description: row.get("description")?,
            hours_spent: row.get("hours_spent")?,
        })
    }
}

pub struct WeeklyReportRepository;

impl WeeklyReportRepository {
    /// Inserts the report and its tasks. Callers provide the transaction.
    pub fn insert(conn: &Connection, report: &WeeklyReportRow, tasks: &[WeeklyTaskRow]) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO weekly_reports (
                    id,
                    student_name,
                    student_id,
                    organisation,
                    industry_supervisor,
                    date_prepared,
                    week_number,
                    plans_for_next_week,
                    total_hours,
                    is_signed,
                    created_at
                ) VALUES (
                    :id,
                    :student_name,
                    :student_id,
                    :organisation,
                    :industry_supervisor,
                    :date_prepared,
                    :week_number,
                    :plans_for_next_week,
                    :total_hours,
                    :is_signed,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &report.id,
                ":student_name": &report.student_name,
                ":student_id": &report.student_id,
                ":organisation": &report.organisation,
                ":industry_supervisor": &report.industry_supervisor,
                ":date_prepared": &report.date_prepared,
                ":week_number": &report.week_number,
                ":plans_for_next_week": &report.plans_for_next_week,
                ":total_hours": &report.total_hours,
                ":is_signed": report.is_signed as i64,
                ":created_at": &report.created_at,
            },
        )?;

        let mut stmt = conn.prepare(
            r#"
                INSERT INTO weekly_report_tasks (
                    id, report_id, position, day, date, description, hours_spent
                ) VALUES (
                    :id, :report_id, :position, :day, :date, :description, :hours_spent
                )
            "#,
        )?;
        for task in tasks {
            stmt.execute(named_params! {
                ":id": &task.id,
                ":report_id": &task.report_id,
                ":position": &task.position,
                ":day": &task.day,
                ":date": &task.date,
                ":description": &task.description,
                ":hours_spent": &task.hours_spent,
            })?;
        }

        Ok(())
    }

    pub fn mark_signed(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute(
            "UPDATE weekly_reports SET is_signed = 1 WHERE id = ?1",
            [id],
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Tasks go with the report through `ON DELETE CASCADE`.
    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM weekly_reports WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<WeeklyReportRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([id], |row| WeeklyReportRow::try_from(row))
            .optional()?;

        match row {
            Some(report) => {
                let tasks = Self::tasks_for(conn, &report.id)?;
                Ok(Some(report.into_record(tasks)))
            }
            None => Ok(None),
        }
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<WeeklyReportRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            BASE_SELECT
        ))?;
        let rows = stmt
            .query_map([], |row| WeeklyReportRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tasks_by_report = Self::all_tasks(conn)?;
        let records = rows
            .into_iter()
            .map(|report| {
                let tasks = tasks_by_report.remove(&report.id).unwrap_or_default();
                report.into_record(tasks)
            })
            .collect();
        Ok(records)
    }

    fn tasks_for(conn: &Connection, report_id: &str) -> AppResult<Vec<WeeklyTaskRow>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE report_id = ?1 ORDER BY position",
            TASK_SELECT
        ))?;
        let tasks = stmt
            .query_map([report_id], |row| WeeklyTaskRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn all_tasks(conn: &Connection) -> AppResult<HashMap<String, Vec<WeeklyTaskRow>>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY report_id, position", TASK_SELECT))?;
        let rows = stmt
            .query_map([], |row| WeeklyTaskRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: HashMap<String, Vec<WeeklyTaskRow>> = HashMap::new();
        for task in rows {
            grouped.entry(task.report_id.clone()).or_default().push(task);
        }
        Ok(grouped)
    }
}
