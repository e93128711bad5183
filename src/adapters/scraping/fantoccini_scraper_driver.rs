use error_stack::ResultExt;
use serde_json::{json, Map, Value};
use std::fmt;
use std::process::Child;
use std::sync::Mutex;
use std::time::Duration;
use tracing::instrument;

use fantoccini::{Client, ClientBuilder};

use super::scraper_driver::{random_port, spawn_driver_process, ScraperDriverError};

const CONNECT_ATTEMPTS: u32 = 20;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(250);

pub struct FantocciniScraperDriver {
    driver_process: Mutex<Option<Child>>,
    pub client: Client,
}

impl fmt::Debug for FantocciniScraperDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantocciniScraperDriver").finish()
    }
}

/// Vendor options for Firefox and Chrome, each driver ignores the other's.
pub fn headless_capabilities() -> Map<String, Value> {
    let mut capabilities = Map::new();
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({ "args": ["-headless"] }),
    );
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless=new", "--window-size=1920,1080"] }),
    );
    capabilities
}

#[instrument]
async fn create_and_configure_client(
    port: u16,
    headless: bool,
) -> error_stack::Result<Client, ScraperDriverError> {
    let mut builder = ClientBuilder::native();
    if headless {
        builder.capabilities(headless_capabilities());
    }
    let url = format!("http://localhost:{}", port);

    // The driver needs a moment before it accepts connections
    let mut attempt = 1;
    let client = loop {
        match builder.connect(&url).await {
            Ok(client) => break client,
            Err(error) if attempt < CONNECT_ATTEMPTS => {
                tracing::trace!(attempt, %error, "Webdriver not ready yet");
                attempt += 1;
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(error) => {
                return Err(error)
                    .change_context(ScraperDriverError::FailedToCreateClient)
                    .attach_printable_lazy(|| {
                        format!("Failed to connect to webdriver on port {}", port)
                    });
            }
        }
    };

    if let Err(error) = client.maximize_window().await {
        tracing::debug!("Could not maximize window: {}", error);
    }

    Ok(client)
}

impl FantocciniScraperDriver {
    #[instrument]
    pub async fn new(
        driver_binary: &str,
        headless: bool,
    ) -> error_stack::Result<Self, ScraperDriverError> {
        let port = random_port();
        let mut process = spawn_driver_process(driver_binary, port)?;

        let client = match create_and_configure_client(port, headless).await {
            Ok(client) => client,
            Err(report) => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(report);
            }
        };

        Ok(FantocciniScraperDriver {
            driver_process: Mutex::new(Some(process)),
            client,
        })
    }

    fn kill_driver_process(&self) {
        let process = self
            .driver_process
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());

        if let Some(mut process) = process {
            process.kill().unwrap_or_else(|error| {
                tracing::error!("Failed to kill webdriver process: {}", error)
            });
            let _ = process.wait();
        }
    }

    #[instrument]
    pub async fn close(&self) {
        self.client
            .clone()
            .close()
            .await
            .unwrap_or_else(|error| tracing::error!("Failed to close WebDriver client: {}", error));

        self.kill_driver_process();
    }
}

impl Drop for FantocciniScraperDriver {
    fn drop(&mut self) {
        self.kill_driver_process();
    }
}
