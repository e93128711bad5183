use log_sheets_sync::adapters::config::{app_config::AppConfig, output_config::OutputConfig};
use log_sheets_sync::prettyprint::prettyprint::PrettyFormatter;
use std::env;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod application_service_factory;
mod cli_adapter;

use application_service_factory::ApplicationServiceFactory;
use cli_adapter::CliAdapter;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    let log_file = match &config {
        Ok(config) => config.output.log_file.clone(),
        Err(_) => OutputConfig::default().log_file,
    };

    setup_tracing(&log_file)?;
    setup_panic_hook();

    let config = config.map_err(|report| {
        error!("Failed to load configuration: {:?}", report);
        format!("Failed to load configuration: {:?}", report)
    })?;

    let args: Vec<String> = env::args().collect();

    info!("Starting log-sheets-sync");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Ctrl-C received, stopping...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Could not listen for Ctrl-C: {e}"),
        }
    });

    let app_service = ApplicationServiceFactory::create(&config, shutdown_rx);
    let cli_adapter = Arc::new(CliAdapter::new(app_service));

    match cli_adapter.run(args).await {
        Ok(_) => {
            info!("CLI execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("CLI execution failed: {:?}", e);
            Err(e)
        }
    }
}

fn setup_tracing(log_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let indicatif_layer = IndicatifLayer::new();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer());

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create(log_file)?)
        .with_ansi(false);

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("log_sheets_sync", tracing::Level::TRACE),
        )
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
