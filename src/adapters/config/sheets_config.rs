#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Service account JSON key, see `README.md`.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: Box<str>,
    /// Takes precedence over `spreadsheet_name` when set.
    #[serde(default)]
    pub spreadsheet_id: Option<Box<str>>,
    #[serde(default = "default_spreadsheet_name")]
    pub spreadsheet_name: Box<str>,
    #[serde(default = "default_worksheet_name")]
    pub worksheet_name: Box<str>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Entries whose message contains any of these are never uploaded.
    #[serde(default)]
    pub skip_message_patterns: Vec<Box<str>>,
}

fn default_credentials_file() -> Box<str> {
    "credentials.json".into()
}

fn default_spreadsheet_name() -> Box<str> {
    "Log Data".into()
}

fn default_worksheet_name() -> Box<str> {
    "Sheet1".into()
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    500
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            spreadsheet_id: None,
            spreadsheet_name: default_spreadsheet_name(),
            worksheet_name: default_worksheet_name(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            skip_message_patterns: Vec::new(),
        }
    }
}
