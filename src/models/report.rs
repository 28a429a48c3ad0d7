use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::end_of_term_report::{EndOfTermReportCreateInput, EndOfTermReportRecord};
use crate::models::weekly_report::{WeeklyReportCreateInput, WeeklyReportRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    Weekly,
    EndOfTerm,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Weekly, ReportKind::EndOfTerm];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Weekly => "weekly",
            ReportKind::EndOfTerm => "endOfTerm",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(ReportKind::Weekly),
            "endofterm" | "end_of_term" | "end-of-term" => Ok(ReportKind::EndOfTerm),
            other => Err(format!("unknown report kind: {other}")),
        }
    }
}

/// Persisted lifecycle position. Drafts live client-side and deleted
/// aggregates no longer exist, so neither is representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportState {
    Created,
    Signed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "report", rename_all = "camelCase")]
pub enum Report {
    Weekly(WeeklyReportRecord),
    EndOfTerm(EndOfTermReportRecord),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Weekly(_) => ReportKind::Weekly,
            Report::EndOfTerm(_) => ReportKind::EndOfTerm,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Report::Weekly(report) => &report.id,
            Report::EndOfTerm(report) => &report.id,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            Report::Weekly(report) => &report.created_at,
            Report::EndOfTerm(report) => &report.created_at,
        }
    }

    pub fn student_name(&self) -> &str {
        match self {
            Report::Weekly(report) => &report.student_name,
            Report::EndOfTerm(report) => &report.student_name,
        }
    }

    pub fn state(&self) -> ReportState {
        let signed = match self {
            Report::Weekly(report) => report.is_signed,
            Report::EndOfTerm(report) => report.is_signed(),
        };
        if signed {
            ReportState::Signed
        } else {
            ReportState::Created
        }
    }

    pub fn as_weekly(&self) -> Option<&WeeklyReportRecord> {
        match self {
            Report::Weekly(report) => Some(report),
            Report::EndOfTerm(_) => None,
        }
    }

    pub fn as_end_of_term(&self) -> Option<&EndOfTermReportRecord> {
        match self {
            Report::EndOfTerm(report) => Some(report),
            Report::Weekly(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum ReportPayload {
    Weekly(WeeklyReportCreateInput),
    EndOfTerm(EndOfTermReportCreateInput),
}

impl ReportPayload {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportPayload::Weekly(_) => ReportKind::Weekly,
            ReportPayload::EndOfTerm(_) => ReportKind::EndOfTerm,
        }
    }
}
