use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutineError {
    #[error("Routine failed: {details}")]
    RoutineFailure { details: String },
}

impl RoutineError {
    pub fn routine_failure<S: Into<String>>(details: S) -> Self {
        RoutineError::RoutineFailure {
            details: details.into(),
        }
    }
}

/// What a single run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutineSummary {
    pub scraped: usize,
    pub uploaded: usize,
}

#[async_trait::async_trait]
pub trait Routine: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> error_stack::Result<RoutineSummary, RoutineError>;
}
