use serde::{Deserialize, Serialize};

/// Fixed rubric, in the order the review form presents it.
pub const RUBRIC_QUESTIONS: [&str; 5] = [
    "awareness of a range of issues associated with professional practice",
    "professional and personal skills",
    "practical skills and theoretical knowledge into an IT industry context",
    "understanding of business processes and organisational structures",
    "professional contacts and networks within the IT industry",
];

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// Self-assessment wording for each score on the rubric scale.
pub fn score_description(score: i64) -> &'static str {
    match score {
        1 => "I like to have help on this",
        2 => "I want to learn more about this",
        3 => "I'm happy with what I know",
        4 => "I know more than enough",
        5 => "I can teach and share this to my colleagues",
        _ => "",
    }
}

pub fn rubric_position(question: &str) -> Option<usize> {
    RUBRIC_QUESTIONS
        .iter()
        .position(|candidate| *candidate == question.trim())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndOfTermReportRecord {
    pub id: String,
    pub student_name: String,
    pub student_id: i64,
    pub organisation: String,
    pub industry_supervisor: String,
    pub date_of_submit: String,
    pub score_items: Vec<ScoreItemRecord>,
    pub student_comments: String,
    pub supervisor_comments: String,
    pub student_signature: String,
    pub student_signature_date: String,
    pub supervisor_signature: Option<String>,
    pub supervisor_signature_date: Option<String>,
    pub created_at: String,
}

impl EndOfTermReportRecord {
    pub fn is_signed(&self) -> bool {
        self.supervisor_signature.is_some()
    }

    pub fn score_for(&self, question: &str) -> Option<i64> {
        self.score_items
            .iter()
            .find(|item| item.question == question)
            .map(|item| item.score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreItemRecord {
    pub id: String,
    pub question: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndOfTermReportCreateInput {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub student_id: i64,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub industry_supervisor: String,
    #[serde(default)]
    pub date_of_submit: String,
    #[serde(default)]
    pub score_items: Vec<ScoreItemInput>,
    #[serde(default)]
    pub student_comments: String,
    #[serde(default)]
    pub supervisor_comments: String,
    #[serde(default)]
    pub student_signature: String,
    #[serde(default)]
    pub student_signature_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreItemInput {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub score: i64,
}

impl ScoreItemInput {
    pub fn new(question: impl Into<String>, score: i64) -> Self {
        Self {
            question: question.into(),
            score,
        }
    }
}
