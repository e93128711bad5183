pub mod application_service;
pub mod command_handler;
pub mod log_sheet;
pub mod log_viewer;
pub mod routine;
pub mod snapshot_store;
