use std::time::Duration;

use crate::adapters::config::app_config::AppConfig;

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub search_query: String,
    pub match_marker: String,
    /// Upper bound on matches visited in one iteration.
    pub max_matches: usize,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub skip_message_patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub scrape: ScrapeSettings,
    pub upload: UploadSettings,
    pub poll_interval: Duration,
}

impl From<&AppConfig> for SyncSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            scrape: ScrapeSettings {
                search_query: config.scraping.search_query.to_string(),
                match_marker: config.scraping.match_marker.to_string(),
                max_matches: config.scraping.max_matches,
            },
            upload: UploadSettings {
                batch_size: config.sheets.batch_size,
                batch_delay: Duration::from_millis(config.sheets.batch_delay_ms),
                skip_message_patterns: config
                    .sheets
                    .skip_message_patterns
                    .iter()
                    .map(|pattern| pattern.to_string())
                    .collect(),
            },
            poll_interval: Duration::from_secs(config.scraping.poll_interval_secs),
        }
    }
}
