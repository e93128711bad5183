use std::sync::Arc;

use tracing::instrument;

use super::spreadsheet_manager::SpreadsheetManager;
use crate::ports::log_sheet::{LogSheet, SheetsError};

/// A1 range covering a whole worksheet.
pub fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

#[derive(Debug)]
pub struct GoogleLogSheet {
    manager: Arc<SpreadsheetManager>,
    spreadsheet_id: String,
    spreadsheet_title: String,
    worksheet: String,
}

impl GoogleLogSheet {
    pub fn new(
        manager: Arc<SpreadsheetManager>,
        spreadsheet_id: String,
        spreadsheet_title: String,
        worksheet: String,
    ) -> Self {
        Self {
            manager,
            spreadsheet_id,
            spreadsheet_title,
            worksheet,
        }
    }

    pub fn spreadsheet_title(&self) -> &str {
        &self.spreadsheet_title
    }
}

#[async_trait::async_trait]
impl LogSheet for GoogleLogSheet {
    fn title(&self) -> &str {
        &self.worksheet
    }

    #[instrument(skip(self), fields(worksheet = %self.worksheet))]
    async fn read_all_rows(&self) -> error_stack::Result<Vec<Vec<String>>, SheetsError> {
        self.manager
            .read_range(&self.spreadsheet_id, &worksheet_range(&self.worksheet))
            .await
    }

    #[instrument(skip(self, rows), fields(worksheet = %self.worksheet, rows = rows.len()))]
    async fn append_rows(&self, rows: &[Vec<String>]) -> error_stack::Result<(), SheetsError> {
        self.manager
            .append_rows(&self.spreadsheet_id, &worksheet_range(&self.worksheet), rows)
            .await
    }
}
