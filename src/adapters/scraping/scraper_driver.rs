use std::process::{Child, Command};

use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ScraperDriverError {
    #[error("Failed to spawn webdriver process")]
    FailedToSpawnDriver,
    #[error("Failed to create client for webdriver")]
    FailedToCreateClient,
}

pub fn random_port() -> u16 {
    rand::random::<u16>() % (65535 - 1024) + 1024
}

/// Starts `geckodriver` (or any driver accepting `--port=N`) in the
/// background.
#[instrument]
pub fn spawn_driver_process(
    driver_binary: &str,
    port: u16,
) -> error_stack::Result<Child, ScraperDriverError> {
    Command::new(driver_binary)
        .arg(format!("--port={}", port))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .change_context(ScraperDriverError::FailedToSpawnDriver)
        .attach_printable_lazy(|| format!("Is '{}' installed and on PATH?", driver_binary))
}
