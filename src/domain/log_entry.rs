use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})")
        .expect("timestamp regex should compile")
});

/// A single log line captured from the viewer.
///
/// Field names are part of the JSON snapshot format, keep them stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub line_number: String,
    pub timestamp: Option<String>,
    pub compression_id: Option<String>,
    pub message: Option<String>,
    pub full_text: String,
}

/// Extracts the structured fields of a log line.
///
/// `marker` is the text that precedes `<id> - <message>` in a matching line,
/// e.g. `__main__:score_compressions:`.
#[derive(Debug, Clone)]
pub struct LogLineParser {
    message_regex: Regex,
}

impl LogLineParser {
    pub fn new(marker: &str) -> Self {
        let pattern = format!(r"{}(\d+)\s*-\s*(.+)", regex::escape(marker));
        Self {
            message_regex: Regex::new(&pattern).expect("escaped marker regex should compile"),
        }
    }

    pub fn parse(&self, line_number: &str, raw_text: &str) -> LogEntry {
        let full_text = normalize_spaces(raw_text);

        let timestamp = TIMESTAMP_REGEX
            .captures(&full_text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string());

        let (compression_id, message) = match self.message_regex.captures(&full_text) {
            Some(captures) => (
                captures.get(1).map(|m| m.as_str().to_string()),
                captures.get(2).map(|m| m.as_str().to_string()),
            ),
            None => (None, None),
        };

        LogEntry {
            line_number: line_number.trim().to_string(),
            timestamp,
            compression_id,
            message,
            full_text,
        }
    }
}

fn normalize_spaces(text: &str) -> String {
    text.trim()
        .replace('\u{a0}', " ")
        .replace("&nbsp;", " ")
}

impl LogEntry {
    /// Short preview of the message for logging.
    pub fn preview(&self, max_chars: usize) -> String {
        match &self.message {
            Some(message) => message.chars().take(max_chars).collect(),
            None => "N/A".to_string(),
        }
    }

    /// Whether the message contains any of `patterns`. Lines without a
    /// parsed message never match.
    pub fn message_contains_any<S: AsRef<str>>(&self, patterns: &[S]) -> bool {
        match &self.message {
            Some(message) => patterns
                .iter()
                .any(|pattern| message.contains(pattern.as_ref())),
            None => false,
        }
    }
}
