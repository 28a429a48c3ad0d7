pub mod end_of_term_report_repository;
pub mod weekly_report_repository;
