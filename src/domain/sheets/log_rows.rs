use std::collections::HashSet;

use crate::domain::log_entry::LogEntry;

pub const HEADER: [&str; 6] = [
    "Line Number",
    "Timestamp",
    "Compression ID",
    "Message",
    "Full Text",
    "Uploaded At",
];

pub const UPLOADED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|column| column.to_string()).collect()
}

impl LogEntry {
    /// Row layout matching [`HEADER`].
    pub fn to_row(&self, uploaded_at: &str) -> Vec<String> {
        vec![
            self.line_number.clone(),
            self.timestamp.clone().unwrap_or_default(),
            self.compression_id.clone().unwrap_or_default(),
            self.message.clone().unwrap_or_default(),
            self.full_text.clone(),
            uploaded_at.to_string(),
        ]
    }
}

/// Line numbers already recorded in the sheet. The first row is always
/// treated as the header.
pub fn existing_line_numbers(rows: &[Vec<String>]) -> HashSet<String> {
    if rows.len() <= 1 {
        return HashSet::new();
    }

    rows.iter()
        .skip(1)
        .filter_map(|row| row.first())
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn new_entries<'a>(entries: &'a [LogEntry], existing: &HashSet<String>) -> Vec<&'a LogEntry> {
    entries
        .iter()
        .filter(|entry| !existing.contains(&entry.line_number))
        .collect()
}
