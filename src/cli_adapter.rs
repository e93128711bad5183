use log_sheets_sync::ports::application_service::ApplicationService;
use log_sheets_sync::ports::command_handler::{Command, CommandError, CommandHandler};
use std::sync::Arc;
use tracing::{error, info, instrument};

use error_stack::ResultExt;

pub const USAGE: &str = "\
Usage: log-sheets-sync [COMMAND]

Commands:
  run                       Poll the log viewer and sync new lines (default)
  once                      Run a single sync iteration and exit
  test, --test              Test the Google Sheets connection
  list-sheets, --list-sheets
                            List spreadsheets shared with the service account
  health                    Print the resolved configuration";

pub struct CliAdapter {
    application_service: Arc<dyn ApplicationService>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("application_service", &"<ApplicationService>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(application_service: Arc<dyn ApplicationService>) -> Self {
        Self {
            application_service,
        }
    }

    #[instrument]
    pub async fn run(&self, args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
        let command = match Self::parse_args(&args) {
            Ok(command) => command,
            Err(error) => {
                error!("{}", error);
                eprintln!("{}", USAGE);
                return Err(error.into());
            }
        };

        match self.handle(command).await {
            Ok(result) => {
                info!("{}", result);
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(format!("Command failed: {:?}", report).into())
            }
        }
    }

    /// `args[0]` is the program name.
    pub fn parse_args(args: &[String]) -> Result<Command, CommandError> {
        match args.get(1).map(|s| s.as_str()) {
            None | Some("run") => Ok(Command::Run),
            Some("once") => Ok(Command::RunOnce),
            Some("test") | Some("--test") => Ok(Command::TestConnection),
            Some("list-sheets") | Some("--list-sheets") => Ok(Command::ListSheets),
            Some("health") => Ok(Command::HealthCheck),
            Some(other) => Err(CommandError::InvalidCommand {
                details: format!("Unknown argument '{}'", other),
            }),
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        let failed = |what: &str| CommandError::ExecutionFailed {
            details: what.to_string(),
        };

        match command {
            Command::Run => {
                self.application_service
                    .run_forever()
                    .await
                    .change_context_lazy(|| failed("Polling loop failed"))?;
                Ok("✅ Scraper stopped".to_string())
            }
            Command::RunOnce => {
                let uploaded = self
                    .application_service
                    .run_once()
                    .await
                    .change_context_lazy(|| failed("Sync iteration failed"))?;
                Ok(format!("✅ Uploaded {} new row(s)", uploaded))
            }
            Command::TestConnection => self
                .application_service
                .test_connection()
                .await
                .change_context_lazy(|| failed("Connection test failed")),
            Command::ListSheets => self
                .application_service
                .list_sheets()
                .await
                .change_context_lazy(|| failed("Listing spreadsheets failed")),
            Command::HealthCheck => self
                .application_service
                .health_check()
                .await
                .change_context_lazy(|| failed("Health check failed")),
        }
    }
}
