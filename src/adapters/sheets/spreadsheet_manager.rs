use error_stack::{report, ResultExt};
use google_sheets4::{api::ValueRange, Sheets};
use std::{collections::HashMap, fmt::Debug};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::ports::log_sheet::SheetsError;

use super::{
    auth::{self, SheetsAuthenticator},
    drive::{DriveClient, DriveFile},
    google_error::sheets_report,
    http_client::{self, HttpsConnector},
    value_range_factory::ValueRangeFactory,
    value_rows::IntoStringRows,
};

const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Cells are stored exactly as scraped, never parsed as dates or formulas.
pub const APPEND_VALUE_INPUT_OPTION: &str = "RAW";
pub const APPEND_INSERT_DATA_OPTION: &str = "INSERT_ROWS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub worksheets: Vec<String>,
}

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    client_email: String,
    hub: Sheets<HttpsConnector>,
    authenticator: SheetsAuthenticator,
    drive: DriveClient,
    spreadsheet_info_cache: RwLock<HashMap<String, SpreadsheetInfo>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

/// Id of the first spreadsheet named `name`. Drive does not enforce unique
/// titles, so extra matches only produce a warning.
pub fn pick_spreadsheet(
    files: Vec<DriveFile>,
    name: &str,
) -> error_stack::Result<String, SheetsError> {
    if files.len() > 1 {
        tracing::warn!(
            "{} spreadsheets are named '{}', using the first one ({})",
            files.len(),
            name,
            files[0].id
        );
    }

    files
        .into_iter()
        .next()
        .map(|file| file.id)
        .ok_or_else(|| report!(SheetsError::SpreadsheetNotFound(name.to_string())))
        .attach_printable("Check the exact, case-sensitive name and that the sheet is shared with the service account")
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(config: SpreadsheetConfig) -> error_stack::Result<Self, SheetsError> {
        let secret = auth::read_service_account_key(&config.credentials_file).await?;
        let client_email = secret.client_email.clone();

        let client = http_client::http_client();
        let authenticator = auth::auth(secret, client.clone()).await?;
        tracing::info!("✓ Credentials loaded for {}", client_email);

        let hub = Sheets::new(client, authenticator.clone());

        Ok(SpreadsheetManager {
            config,
            client_email,
            hub,
            authenticator,
            drive: DriveClient::new(),
            spreadsheet_info_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    #[instrument]
    async fn drive_token(&self) -> error_stack::Result<String, SheetsError> {
        let token = self
            .authenticator
            .token(&[DRIVE_READONLY_SCOPE])
            .await
            .change_context(SheetsError::AuthenticatorFailed)?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| report!(SheetsError::AuthenticatorFailed))
            .attach_printable("Access token missing from authenticator response")
    }

    /// Spreadsheets visible to the service account, optionally filtered by
    /// exact title.
    #[instrument]
    pub async fn list_spreadsheet_files(
        &self,
        name: Option<&str>,
    ) -> error_stack::Result<Vec<DriveFile>, SheetsError> {
        let token = self.drive_token().await?;
        self.drive.list_spreadsheets(&token, name).await
    }

    /// The configured spreadsheet id, looking it up by name if no id is set.
    #[instrument]
    pub async fn resolve_spreadsheet_id(&self) -> error_stack::Result<String, SheetsError> {
        if let Some(id) = &self.config.spreadsheet_id {
            return Ok(id.to_string());
        }

        let name = self.config.spreadsheet_name.as_ref();
        let files = self.list_spreadsheet_files(Some(name)).await?;
        pick_spreadsheet(files, name)
    }

    #[instrument]
    pub async fn spreadsheet_info(
        &self,
        spreadsheet_id: &str,
    ) -> error_stack::Result<SpreadsheetInfo, SheetsError> {
        if let Some(info) = self
            .spreadsheet_info_cache
            .read()
            .await
            .get(spreadsheet_id)
            .cloned()
        {
            return Ok(info);
        }

        let response = self
            .hub
            .spreadsheets()
            .get(spreadsheet_id)
            .doit()
            .await
            .map_err(|e| {
                sheets_report(
                    e,
                    SheetsError::SpreadsheetNotFound(spreadsheet_id.to_string()),
                    SheetsError::FailedToFetchRange,
                )
            })?;

        let spreadsheet = response.1;
        let title = spreadsheet
            .properties
            .and_then(|properties| properties.title)
            .unwrap_or_else(|| spreadsheet_id.to_string());
        let worksheets = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties.and_then(|properties| properties.title))
            .collect::<Vec<_>>();

        let info = SpreadsheetInfo { title, worksheets };

        // -- MUTEX WRITE --
        self.spreadsheet_info_cache
            .write()
            .await
            .insert(spreadsheet_id.to_string(), info.clone());

        Ok(info)
    }

    #[instrument]
    pub async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .doit()
            .await
            .map_err(|e| {
                sheets_report(
                    e,
                    SheetsError::SpreadsheetNotFound(spreadsheet_id.to_string()),
                    SheetsError::FailedToFetchRange,
                )
            })
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        // An empty worksheet has no `values` at all
        Ok(response.1.values.unwrap_or_default().into_string_rows())
    }

    #[instrument(skip(rows), fields(rows = rows.len()))]
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> error_stack::Result<(), SheetsError> {
        let value_range = ValueRange::from_rows(rows);

        self.hub
            .spreadsheets()
            .values_append(value_range, spreadsheet_id, range)
            .value_input_option(APPEND_VALUE_INPUT_OPTION)
            .insert_data_option(APPEND_INSERT_DATA_OPTION)
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| {
                sheets_report(
                    e,
                    SheetsError::SpreadsheetNotFound(spreadsheet_id.to_string()),
                    SheetsError::FailedToAppendRows,
                )
            })
            .attach_printable_lazy(|| format!("Failed to append to range {}", range))
    }
}
