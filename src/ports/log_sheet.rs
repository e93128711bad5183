use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetsError {
    #[error("Credentials file '{0}' not found")]
    CredentialsNotFound(String),
    #[error("Credentials file is not a valid service account key")]
    InvalidCredentials,
    #[error("Could not create an authenticator")]
    AuthenticatorFailed,
    #[error("Google Sheet '{0}' not found")]
    SpreadsheetNotFound(String),
    #[error("Worksheet '{worksheet}' not found in '{spreadsheet}'")]
    WorksheetNotFound {
        worksheet: String,
        spreadsheet: String,
    },
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to append rows")]
    FailedToAppendRows,
    #[error("Failed to list spreadsheets")]
    FailedToListSpreadsheets,
}

impl SheetsError {
    /// Hints printed when the sheet cannot be opened.
    pub fn troubleshooting(&self) -> &'static [&'static str] {
        match self {
            SheetsError::CredentialsNotFound(_) | SheetsError::InvalidCredentials => &[
                "Create a service account and download its JSON key file",
                "Place it next to the program or point GOOGLE_SHEETS_CREDENTIALS_FILE at it",
            ],
            SheetsError::SpreadsheetNotFound(_) => &[
                "The sheet name is case-sensitive, check GOOGLE_SHEET_NAME",
                "The sheet must be shared with the service account's client_email",
                "Run `list-sheets` to see every sheet the service account can access",
            ],
            SheetsError::WorksheetNotFound { .. } => {
                &["The worksheet name is case-sensitive, check GOOGLE_WORKSHEET_NAME"]
            }
            SheetsError::PermissionDenied => &[
                "Share the sheet with the service account's client_email as Editor",
                "Enable both the Google Sheets API and the Google Drive API",
            ],
            _ => &[
                "Make sure the credentials file exists and is valid",
                "Verify the Google Sheet is shared with the service account email",
                "Check that GOOGLE_SHEET_NAME and GOOGLE_WORKSHEET_NAME are correct",
            ],
        }
    }
}

/// A worksheet holding one row per recorded log line.
#[async_trait::async_trait]
pub trait LogSheet: Send + Sync {
    fn title(&self) -> &str;

    async fn read_all_rows(&self) -> error_stack::Result<Vec<Vec<String>>, SheetsError>;

    async fn append_rows(&self, rows: &[Vec<String>]) -> error_stack::Result<(), SheetsError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetSummary {
    pub id: String,
    pub title: String,
    pub worksheets: Vec<String>,
}

#[async_trait::async_trait]
pub trait SheetCatalog: Send + Sync {
    /// Identity the spreadsheets must be shared with.
    fn client_email(&self) -> &str;

    async fn list_spreadsheets(
        &self,
    ) -> error_stack::Result<Vec<SpreadsheetSummary>, SheetsError>;
}

/// Entry point to the spreadsheet backend.
#[async_trait::async_trait]
pub trait SheetsConnector: Send + Sync {
    /// Opens the configured worksheet.
    async fn open_sheet(&self) -> error_stack::Result<std::sync::Arc<dyn LogSheet>, SheetsError>;

    async fn catalog(&self) -> error_stack::Result<std::sync::Arc<dyn SheetCatalog>, SheetsError>;
}
