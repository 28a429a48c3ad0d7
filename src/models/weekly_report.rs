use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReportRecord {
    pub id: String,
    pub student_name: String,
    pub student_id: i64,
    pub organisation: String,
    pub industry_supervisor: String,
    pub date_prepared: String,
    pub week_number: i64,
    pub tasks: Vec<WeeklyTaskRecord>,
    pub plans_for_next_week: String,
    pub total_hours: f64,
    pub is_signed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTaskRecord {
    pub id: String,
    pub day: i64,
    pub date: String,
    pub description: String,
    pub hours_spent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReportCreateInput {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_id: i64,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub industry_supervisor: String,
    #[serde(default)]
    pub date_prepared: String,
    #[serde(default)]
    pub week_number: i64,
    #[serde(default)]
    pub tasks: Vec<WeeklyTaskInput>,
    #[serde(default)]
    pub plans_for_next_week: String,
    #[serde(default)]
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTaskInput {
    #[serde(default)]
    pub day: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours_spent: f64,
}

impl WeeklyReportCreateInput {
    /// Sum of the submitted task hours; what a well-behaved client sends as `total_hours`.
    pub fn task_hours(&self) -> f64 {
        self.tasks.iter().map(|task| task.hours_spent).sum()
    }
}
