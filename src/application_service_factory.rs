use log_sheets_sync::{
    adapters::{
        config::app_config::AppConfig,
        scraping::fantoccini_log_viewer::FantocciniLogViewerFactory,
        sheets::connector::GoogleSheetsConnector,
        snapshot::json_snapshot::JsonSnapshotStore,
    },
    application::{service::LogSyncApplicationService, settings::SyncSettings},
    ports::application_service::ApplicationService,
};

use std::sync::Arc;
use tokio::sync::watch;

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    pub fn create(
        config: &AppConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Arc<dyn ApplicationService> {
        let connector = Arc::new(GoogleSheetsConnector::new(config.sheets.clone()));
        let viewer_factory = Arc::new(FantocciniLogViewerFactory::new(config.scraping.clone()));
        let snapshot = Arc::new(JsonSnapshotStore::new(config.output.snapshot_file.to_string()));

        Arc::new(LogSyncApplicationService::new(
            connector,
            viewer_factory,
            snapshot,
            SyncSettings::from(config),
            shutdown,
        ))
    }
}
