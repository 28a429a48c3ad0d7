pub mod end_of_term_report;
pub mod report;
pub mod weekly_report;
