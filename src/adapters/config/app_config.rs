use config::{builder::DefaultState, Config, ConfigBuilder};
use error_stack::{report, ResultExt};
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use super::{
    output_config::OutputConfig, scraping_config::ScrapingConfig,
    sheets_config::SpreadsheetConfig,
};

/// Environment variables overriding single config keys.
pub const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("GOOGLE_SHEETS_CREDENTIALS_FILE", "sheets.credentials_file"),
    ("GOOGLE_SHEET_NAME", "sheets.spreadsheet_name"),
    ("GOOGLE_WORKSHEET_NAME", "sheets.worksheet_name"),
    ("LOG_VIEWER_URL", "scraping.url"),
];

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub sheets: SpreadsheetConfig,
    pub scraping: ScrapingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file '{0}'")]
    ReadFailed(String),
    #[error("Failed to deserialize config, field path: {0}")]
    InvalidField(String),
}

impl AppConfig {
    /// Reads `CONFIG_PATH` (default `Config`, any extension supported by
    /// `config`) and applies the environment overrides.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "Config".to_string());
        let builder = Config::builder()
            .add_source(config::File::with_name(&config_path).required(false));

        Self::from_builder(builder, |key| std::env::var(key).ok())
            .attach_printable_lazy(|| format!("Config file: {}", config_path))
    }

    pub fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        env: impl Fn(&str) -> Option<String>,
    ) -> error_stack::Result<Self, ConfigError> {
        let mut builder = builder;
        for (variable, key) in ENV_OVERRIDES {
            builder = builder
                .set_override_option(key, env(variable))
                .change_context_lazy(|| ConfigError::ReadFailed(key.to_string()))?;
        }

        let config = builder
            .build()
            .map_err(|e| report!(ConfigError::ReadFailed(e.to_string())))?;

        let value = config
            .try_deserialize::<serde_json::Value>()
            .map_err(|e| report!(ConfigError::ReadFailed(e.to_string())))?;

        use serde::de::IntoDeserializer;
        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        AppConfig::deserialize(path_de).map_err(|e| {
            let path_str = track
                .path()
                .iter()
                .map(|seg| match seg {
                    Segment::Seq { index } => format!("[{}]", index),
                    Segment::Map { key } => format!(".{}", key),
                    Segment::Enum { variant } => format!("::{}", variant),
                    Segment::Unknown => String::from("<?>"),
                })
                .collect::<String>();
            report!(ConfigError::InvalidField(
                path_str.trim_start_matches('.').to_string()
            ))
            .attach_printable(e.to_string())
            .attach_printable("Make sure all required fields are present in the configuration file.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn builder(toml: &str) -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(toml, FileFormat::Toml))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_builder(
            builder("[scraping]\nurl = \"https://example.com/logs\""),
            no_env,
        )
        .unwrap();

        assert_eq!(config.scraping.url.as_ref(), "https://example.com/logs");
        assert_eq!(config.scraping.poll_interval_secs, 300);
        assert_eq!(config.scraping.wait_timeout_secs, 10);
        assert_eq!(
            config.scraping.match_marker.as_ref(),
            "__main__:score_compressions:"
        );
        assert_eq!(config.sheets.credentials_file.as_ref(), "credentials.json");
        assert_eq!(config.sheets.spreadsheet_name.as_ref(), "Log Data");
        assert_eq!(config.sheets.worksheet_name.as_ref(), "Sheet1");
        assert_eq!(config.sheets.spreadsheet_id, None);
        assert_eq!(config.sheets.batch_size, 100);
        assert!(config.sheets.skip_message_patterns.is_empty());
        assert_eq!(config.output.snapshot_file.as_ref(), "info_logs.json");
    }

    #[test]
    fn test_file_values() {
        let toml = r#"
            [sheets]
            spreadsheet_id = "abc"
            worksheet_name = "Logs"
            batch_size = 20
            skip_message_patterns = ["Uids:", "sent to dashboard"]

            [scraping]
            url = "https://example.com/logs"
            headless = false
        "#;
        let config = AppConfig::from_builder(builder(toml), no_env).unwrap();

        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(config.sheets.worksheet_name.as_ref(), "Logs");
        assert_eq!(config.sheets.batch_size, 20);
        assert_eq!(
            config.sheets.skip_message_patterns,
            vec![Box::<str>::from("Uids:"), Box::<str>::from("sent to dashboard")]
        );
        assert!(!config.scraping.headless);
    }

    #[test]
    fn test_env_overrides() {
        let env = |key: &str| match key {
            "GOOGLE_SHEETS_CREDENTIALS_FILE" => Some("/secrets/key.json".to_string()),
            "GOOGLE_SHEET_NAME" => Some("Other Sheet".to_string()),
            "GOOGLE_WORKSHEET_NAME" => Some("Tab2".to_string()),
            _ => None,
        };
        let toml = r#"
            [sheets]
            spreadsheet_name = "From File"

            [scraping]
            url = "https://example.com/logs"
        "#;
        let config = AppConfig::from_builder(builder(toml), env).unwrap();

        assert_eq!(config.sheets.credentials_file.as_ref(), "/secrets/key.json");
        assert_eq!(config.sheets.spreadsheet_name.as_ref(), "Other Sheet");
        assert_eq!(config.sheets.worksheet_name.as_ref(), "Tab2");
    }

    #[test]
    fn test_url_from_env_only() {
        let env = |key: &str| (key == "LOG_VIEWER_URL").then(|| "https://env.example".to_string());
        let config = AppConfig::from_builder(Config::builder(), env).unwrap();
        assert_eq!(config.scraping.url.as_ref(), "https://env.example");
    }

    #[test]
    fn test_missing_url_names_field() {
        let result = AppConfig::from_builder(builder("[scraping]\nheadless = true"), no_env);
        let report = result.unwrap_err();
        assert!(matches!(
            report.current_context(),
            ConfigError::InvalidField(path) if path.starts_with("scraping")
        ));
    }
}
