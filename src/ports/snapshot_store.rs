use thiserror::Error;

use crate::domain::log_entry::LogEntry;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to write snapshot")]
    WriteFailed,
}

/// Local copy of the entries scraped in the latest iteration.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, entries: &[LogEntry]) -> error_stack::Result<(), SnapshotError>;
}
