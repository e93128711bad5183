pub mod auth;
pub mod connector;
pub mod drive;
pub mod google_error;
pub mod http_client;
pub mod log_sheet;
pub mod spreadsheet_manager;
pub mod value_range_factory;
pub mod value_rows;
