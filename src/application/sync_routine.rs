use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use super::{scrape::scrape_matches, settings::SyncSettings, upload::upload_new_entries};
use crate::domain::sheets::log_rows::UPLOADED_AT_FORMAT;
use crate::ports::log_sheet::LogSheet;
use crate::ports::log_viewer::LogViewer;
use crate::ports::routine::{Routine, RoutineError, RoutineSummary};
use crate::ports::snapshot_store::SnapshotStore;

/// One scrape, snapshot and upload pass.
pub struct SyncRoutine {
    viewer: Arc<dyn LogViewer>,
    sheet: Option<Arc<dyn LogSheet>>,
    snapshot: Arc<dyn SnapshotStore>,
    settings: SyncSettings,
}

impl std::fmt::Debug for SyncRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRoutine")
            .field("sheet", &self.sheet.as_ref().map(|sheet| sheet.title().to_string()))
            .finish()
    }
}

impl SyncRoutine {
    pub fn new(
        viewer: Arc<dyn LogViewer>,
        sheet: Option<Arc<dyn LogSheet>>,
        snapshot: Arc<dyn SnapshotStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            viewer,
            sheet,
            snapshot,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl Routine for SyncRoutine {
    fn name(&self) -> &str {
        "sync-logs"
    }

    #[instrument(skip(self))]
    async fn run(&self) -> error_stack::Result<RoutineSummary, RoutineError> {
        let entries = scrape_matches(self.viewer.as_ref(), &self.settings.scrape).await?;

        if entries.is_empty() {
            return Ok(RoutineSummary::default());
        }

        self.snapshot
            .save(&entries)
            .change_context(RoutineError::routine_failure("Could not save local snapshot"))?;

        let uploaded = match &self.sheet {
            Some(sheet) => {
                let uploaded_at = chrono::Local::now().format(UPLOADED_AT_FORMAT).to_string();
                upload_new_entries(
                    sheet.as_ref(),
                    &entries,
                    &self.settings.upload,
                    &uploaded_at,
                )
                .await?
            }
            None => 0,
        };

        Ok(RoutineSummary {
            scraped: entries.len(),
            uploaded,
        })
    }
}
