use std::sync::Arc;

use error_stack::{report, ResultExt};
use tokio::sync::OnceCell;
use tracing::instrument;

use super::{
    log_sheet::GoogleLogSheet,
    spreadsheet_manager::{SpreadsheetInfo, SpreadsheetManager},
};
use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::ports::log_sheet::{
    LogSheet, SheetCatalog, SheetsConnector, SheetsError, SpreadsheetSummary,
};

/// Opens worksheets and lists spreadsheets with a single authenticated
/// manager, created on first use.
#[derive(Debug)]
pub struct GoogleSheetsConnector {
    config: SpreadsheetConfig,
    manager: OnceCell<Arc<SpreadsheetManager>>,
}

impl GoogleSheetsConnector {
    pub fn new(config: SpreadsheetConfig) -> Self {
        Self {
            config,
            manager: OnceCell::new(),
        }
    }

    async fn manager(&self) -> error_stack::Result<Arc<SpreadsheetManager>, SheetsError> {
        self.manager
            .get_or_try_init(|| async {
                SpreadsheetManager::new(self.config.clone())
                    .await
                    .map(Arc::new)
            })
            .await
            .cloned()
    }
}

/// Matches `worksheet` against the spreadsheet's tab titles, case-sensitively.
pub fn ensure_worksheet(
    info: &SpreadsheetInfo,
    worksheet: &str,
) -> error_stack::Result<String, SheetsError> {
    if info.worksheets.iter().any(|title| title == worksheet) {
        return Ok(worksheet.to_string());
    }

    Err(report!(SheetsError::WorksheetNotFound {
        worksheet: worksheet.to_string(),
        spreadsheet: info.title.clone(),
    }))
    .attach_printable(format!("Available worksheets: {}", info.worksheets.join(", ")))
}

#[async_trait::async_trait]
impl SheetsConnector for GoogleSheetsConnector {
    #[instrument(skip(self))]
    async fn open_sheet(&self) -> error_stack::Result<Arc<dyn LogSheet>, SheetsError> {
        let manager = self.manager().await?;

        tracing::info!("Opening Google Sheet: '{}'...", self.config.spreadsheet_name);
        let spreadsheet_id = manager.resolve_spreadsheet_id().await?;
        let info = manager.spreadsheet_info(&spreadsheet_id).await?;
        tracing::info!("✓ Sheet found: {}", info.title);

        let worksheet = ensure_worksheet(&info, &self.config.worksheet_name)?;
        tracing::info!("✓ Worksheet found: {}", worksheet);

        let sheet = GoogleLogSheet::new(manager, spreadsheet_id, info.title, worksheet);

        match sheet.read_all_rows().await {
            Ok(rows) => tracing::info!("✓ Test read successful. Sheet has {} rows", rows.len()),
            Err(report) => tracing::warn!("⚠ Could not read sheet data: {:?}", report),
        }

        Ok(Arc::new(sheet))
    }

    #[instrument(skip(self))]
    async fn catalog(&self) -> error_stack::Result<Arc<dyn SheetCatalog>, SheetsError> {
        Ok(Arc::new(GoogleSheetCatalog {
            manager: self.manager().await?,
        }))
    }
}

#[derive(Debug)]
pub struct GoogleSheetCatalog {
    manager: Arc<SpreadsheetManager>,
}

#[async_trait::async_trait]
impl SheetCatalog for GoogleSheetCatalog {
    fn client_email(&self) -> &str {
        self.manager.client_email()
    }

    #[instrument(skip(self))]
    async fn list_spreadsheets(
        &self,
    ) -> error_stack::Result<Vec<SpreadsheetSummary>, SheetsError> {
        let files = self
            .manager
            .list_spreadsheet_files(None)
            .await?;

        let mut summaries = Vec::with_capacity(files.len());
        for file in files {
            let worksheets = match self.manager.spreadsheet_info(&file.id).await {
                Ok(info) => info.worksheets,
                Err(report) => {
                    tracing::warn!("Could not list worksheets of '{}': {:?}", file.name, report);
                    Vec::new()
                }
            };

            summaries.push(SpreadsheetSummary {
                id: file.id,
                title: file.name,
                worksheets,
            });
        }

        Ok(summaries)
    }
}
