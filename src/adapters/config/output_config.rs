#[derive(serde::Deserialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: Box<str>,
    #[serde(default = "default_log_file")]
    pub log_file: Box<str>,
}

fn default_snapshot_file() -> Box<str> {
    "info_logs.json".into()
}

fn default_log_file() -> Box<str> {
    "log_sheets_sync.log".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            log_file: default_log_file(),
        }
    }
}
