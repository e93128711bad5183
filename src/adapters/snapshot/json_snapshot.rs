use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use error_stack::ResultExt;
use tracing::instrument;

use crate::domain::log_entry::LogEntry;
use crate::ports::snapshot_store::{SnapshotError, SnapshotStore};

/// Overwrites a pretty-printed JSON array on every save.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for JsonSnapshotStore {
    #[instrument(skip(entries), fields(entries = entries.len()))]
    fn save(&self, entries: &[LogEntry]) -> error_stack::Result<(), SnapshotError> {
        let file = File::create(&self.path)
            .change_context(SnapshotError::WriteFailed)
            .attach_printable_lazy(|| format!("Could not create {}", self.path.display()))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries)
            .change_context(SnapshotError::WriteFailed)?;
        writer.flush().change_context(SnapshotError::WriteFailed)?;

        tracing::info!(
            "Saved {} entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_save_writes_json_array() {
        let path = temp_path("snapshot-array");
        let store = JsonSnapshotStore::new(&path);
        let entries = vec![LogEntry {
            line_number: "7".to_string(),
            timestamp: Some("2024-05-12 10:21:33.123".to_string()),
            compression_id: None,
            message: Some("héllo ✓".to_string()),
            full_text: "raw".to_string(),
        }];

        store.save(&entries).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        // Non-ASCII text is written as-is, not escaped
        assert!(written.contains("héllo ✓"));
        let parsed: Vec<LogEntry> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, entries);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let path = temp_path("snapshot-overwrite");
        let store = JsonSnapshotStore::new(&path);
        let entry = |n: &str| LogEntry {
            line_number: n.to_string(),
            timestamp: None,
            compression_id: None,
            message: None,
            full_text: String::new(),
        };

        store.save(&[entry("1"), entry("2")]).unwrap();
        store.save(&[entry("3")]).unwrap();

        let parsed: Vec<LogEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![entry("3")]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let store = JsonSnapshotStore::new("/nonexistent-dir-for-test/info_logs.json");
        let report = store.save(&[]).unwrap_err();
        assert!(matches!(report.current_context(), SnapshotError::WriteFailed));
    }
}
