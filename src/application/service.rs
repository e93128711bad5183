use std::{sync::Arc, time::Duration};

use error_stack::{report, ResultExt};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use super::{settings::SyncSettings, sync_routine::SyncRoutine};
use crate::ports::application_service::{ApplicationService, ApplicationServiceError};
use crate::ports::log_sheet::{LogSheet, SheetsConnector};
use crate::ports::log_viewer::{LogViewer, LogViewerFactory};
use crate::ports::routine::Routine;
use crate::ports::snapshot_store::SnapshotStore;

pub struct LogSyncApplicationService {
    connector: Arc<dyn SheetsConnector>,
    viewer_factory: Arc<dyn LogViewerFactory>,
    snapshot: Arc<dyn SnapshotStore>,
    settings: SyncSettings,
    shutdown: watch::Receiver<bool>,
}

impl std::fmt::Debug for LogSyncApplicationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSyncApplicationService")
            .field("settings", &self.settings)
            .finish()
    }
}

impl LogSyncApplicationService {
    /// `shutdown` flips to `true` when the polling loop should stop.
    pub fn new(
        connector: Arc<dyn SheetsConnector>,
        viewer_factory: Arc<dyn LogViewerFactory>,
        snapshot: Arc<dyn SnapshotStore>,
        settings: SyncSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            connector,
            viewer_factory,
            snapshot,
            settings,
            shutdown,
        }
    }

    /// Opens the worksheet, or explains why it could not and returns `None`.
    #[instrument(skip(self))]
    async fn open_sheet_or_warn(&self) -> Option<Arc<dyn LogSheet>> {
        info!("--- Initializing Google Sheets Connection ---");
        match self.connector.open_sheet().await {
            Ok(sheet) => {
                info!("✓ Google Sheets ready for uploads!");
                Some(sheet)
            }
            Err(report) => {
                error!("❌ ERROR initializing Google Sheets: {:?}", report);
                for hint in report.current_context().troubleshooting() {
                    warn!("  - {}", hint);
                }
                warn!("⚠ Google Sheets not initialized. Data will only be saved locally.");
                None
            }
        }
    }

    async fn open_viewer(&self) -> error_stack::Result<Arc<dyn LogViewer>, ApplicationServiceError> {
        self.viewer_factory
            .open()
            .await
            .map(Arc::from)
            .change_context(ApplicationServiceError::InitializationFailed {
                details: "Could not open the log viewer".to_string(),
            })
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleeps for `duration`. Returns `true` if shutdown was requested first.
    async fn sleep_or_shutdown(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = wait_for_shutdown(self.shutdown.clone()) => true,
        }
    }
}

/// Resolves once shutdown is requested. Never resolves if the sender is gone.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[async_trait::async_trait]
impl ApplicationService for LogSyncApplicationService {
    #[instrument(skip(self))]
    async fn run_forever(&self) -> error_stack::Result<(), ApplicationServiceError> {
        info!("STARTING LOG SCRAPER WITH GOOGLE SHEETS INTEGRATION");

        let sheet = self.open_sheet_or_warn().await;
        let viewer = self.open_viewer().await?;
        let routine = SyncRoutine::new(
            Arc::clone(&viewer),
            sheet,
            Arc::clone(&self.snapshot),
            self.settings.clone(),
        );

        let poll_interval = self.settings.poll_interval;
        let mut iteration = 0u64;

        while !self.shutdown_requested() {
            iteration += 1;
            info!("ITERATION #{}", iteration);

            let result = tokio::select! {
                result = routine.run() => result,
                _ = wait_for_shutdown(self.shutdown.clone()) => break,
            };

            match result {
                Ok(summary) => info!(
                    "Iteration #{} done: {} scraped, {} uploaded",
                    iteration, summary.scraped, summary.uploaded
                ),
                Err(report) => {
                    error!("Error in main loop: {:?}", report);
                    warn!("Waiting before retry...");
                }
            }

            let next_time = chrono::Local::now()
                + chrono::Duration::from_std(poll_interval).unwrap_or_else(|_| chrono::Duration::zero());
            info!(
                "Waiting {}s before next refresh. Next scrape will start at {}",
                poll_interval.as_secs(),
                next_time.format("%Y-%m-%d %H:%M:%S")
            );

            if self.sleep_or_shutdown(poll_interval).await {
                break;
            }
        }

        info!("Stopped by user.");
        viewer.close().await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn run_once(&self) -> error_stack::Result<usize, ApplicationServiceError> {
        let sheet = self.open_sheet_or_warn().await;
        let viewer = self.open_viewer().await?;
        let routine = SyncRoutine::new(
            Arc::clone(&viewer),
            sheet,
            Arc::clone(&self.snapshot),
            self.settings.clone(),
        );

        let result = routine.run().await;
        viewer.close().await;

        let summary = result.change_context(ApplicationServiceError::RoutineExecutionFailed {
            details: format!("Routine '{}' failed", routine.name()),
        })?;
        Ok(summary.uploaded)
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> error_stack::Result<String, ApplicationServiceError> {
        let sheet = self.connector.open_sheet().await.map_err(|report| {
            let hints = report.current_context().troubleshooting().join("\n");
            report
                .change_context(ApplicationServiceError::SheetsUnavailable)
                .attach_printable(format!(
                    "Troubleshooting:\n{}\nRun `list-sheets` to see every sheet the service account can access",
                    hints
                ))
        })?;

        // Unreadable contents only warn once the worksheet is open
        let values = match sheet.read_all_rows().await {
            Ok(values) => values,
            Err(report) => {
                warn!("⚠ Could not read sheet data: {:?}", report);
                return Ok(format!(
                    "✓ Connection test successful!\n⚠ Could not read sheet data: {}",
                    report.current_context()
                ));
            }
        };

        let mut output = format!(
            "✓ Connection test successful!\nCurrent rows in sheet: {}",
            values.len()
        );
        if let Some(header) = values.first() {
            output.push_str(&format!("\nHeader row: {:?}", header));
        }
        if let Some(sample) = values.get(1) {
            output.push_str(&format!("\nSample data row: {:?}", sample));
        }
        Ok(output)
    }

    #[instrument(skip(self))]
    async fn list_sheets(&self) -> error_stack::Result<String, ApplicationServiceError> {
        let catalog = self
            .connector
            .catalog()
            .await
            .change_context(ApplicationServiceError::SheetsUnavailable)?;

        info!("Fetching all accessible spreadsheets...");
        let spreadsheets = catalog
            .list_spreadsheets()
            .await
            .change_context(ApplicationServiceError::SheetsUnavailable)?;

        if spreadsheets.is_empty() {
            return Ok(format!(
                "❌ No spreadsheets found!\n\
                 The service account doesn't have access to any sheets.\n\
                 To fix this:\n\
                 1. Open your Google Sheet\n\
                 2. Click 'Share'\n\
                 3. Share the sheet with {} as Editor",
                catalog.client_email()
            ));
        }

        let mut output = format!(
            "✓ Found {} accessible spreadsheet(s):\n",
            spreadsheets.len()
        );
        for (index, spreadsheet) in spreadsheets.iter().enumerate() {
            output.push_str(&format!(
                "\n{}. '{}' (ID: {})\n",
                index + 1,
                spreadsheet.title,
                spreadsheet.id
            ));
            if spreadsheet.worksheets.is_empty() {
                output.push_str("   (Could not list worksheets)\n");
            } else {
                output.push_str(&format!(
                    "   Worksheets: {}\n",
                    spreadsheet.worksheets.join(", ")
                ));
            }
        }
        output.push_str("\nTo use a sheet, set GOOGLE_SHEET_NAME to the exact name above.");
        Ok(output)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError> {
        if self.settings.scrape.match_marker.is_empty() {
            return Err(report!(ApplicationServiceError::InitializationFailed {
                details: "Match marker is empty".to_string(),
            }));
        }

        Ok(format!(
            "🟢 log-sheets-sync - Healthy\n\
             Search query: {:?}\n\
             Match marker: {:?}\n\
             Poll interval: {}s\n\
             Upload batch size: {}",
            self.settings.scrape.search_query,
            self.settings.scrape.match_marker,
            self.settings.poll_interval.as_secs(),
            self.settings.upload.batch_size,
        ))
    }
}
