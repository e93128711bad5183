pub mod log_entry;
pub mod match_counter;
pub mod sheets;

// Re-export commonly used types
pub use log_entry::*;
pub use match_counter::*;
