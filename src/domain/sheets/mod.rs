pub mod log_rows;
