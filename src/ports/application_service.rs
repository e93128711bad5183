use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationServiceError {
    #[error("Service initialization failed: {details}")]
    InitializationFailed { details: String },
    #[error("Routine execution failed: {details}")]
    RoutineExecutionFailed { details: String },
    #[error("Google Sheets is not available")]
    SheetsUnavailable,
}

#[async_trait::async_trait]
pub trait ApplicationService: Send + Sync {
    /// Polls until interrupted.
    async fn run_forever(&self) -> error_stack::Result<(), ApplicationServiceError>;

    async fn run_once(&self) -> error_stack::Result<usize, ApplicationServiceError>;

    async fn test_connection(&self) -> error_stack::Result<String, ApplicationServiceError>;

    async fn list_sheets(&self) -> error_stack::Result<String, ApplicationServiceError>;

    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError>;
}
