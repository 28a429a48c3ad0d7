pub mod export;
pub mod listing_cache;
pub mod report_board;
pub mod report_draft;
pub mod report_events;
pub mod report_service;
pub mod validation;
