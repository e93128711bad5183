#[derive(serde::Deserialize, Debug, Clone)]
pub struct ScrapingConfig {
    pub url: Box<str>,
    #[serde(default = "default_search_query")]
    pub search_query: Box<str>,
    /// Text identifying a matching line, followed by `<id> - <message>`.
    #[serde(default = "default_match_marker")]
    pub match_marker: Box<str>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
    #[serde(default = "default_webdriver")]
    pub webdriver: Box<str>,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_search_query() -> Box<str> {
    "| INFO     | __main__:score_compressions:".into()
}

fn default_match_marker() -> Box<str> {
    "__main__:score_compressions:".into()
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_max_matches() -> usize {
    10_000
}

fn default_webdriver() -> Box<str> {
    "geckodriver".into()
}

fn default_headless() -> bool {
    true
}
