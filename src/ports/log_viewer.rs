use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogViewerError {
    #[error("Failed to reload the log page")]
    ReloadFailed,
    #[error("Failed to set up the search")]
    SearchFailed,
    #[error("Highlighted match not found")]
    MatchNotFound,
    #[error("Failed to read match content")]
    MatchContentUnavailable,
    #[error("Failed to move to the next match")]
    NextMatchFailed,
    #[error("Failed to open the log viewer")]
    OpenFailed,
}

/// The line currently highlighted by the viewer's search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub line_number: String,
    pub text: String,
}

/// A browser page showing a searchable log.
#[async_trait::async_trait]
pub trait LogViewer: Send + Sync {
    async fn reload(&self) -> error_stack::Result<(), LogViewerError>;

    /// Types `query` into the search box and jumps to the first match.
    async fn search(&self, query: &str) -> error_stack::Result<(), LogViewerError>;

    /// Reads the highlighted line containing `marker`.
    async fn current_match(&self, marker: &str) -> error_stack::Result<RawMatch, LogViewerError>;

    /// Raw text of the match counter, `None` if it is not displayed.
    async fn match_counter(&self) -> Option<String>;

    async fn next_match(&self) -> error_stack::Result<(), LogViewerError>;

    async fn close(&self);
}

#[async_trait::async_trait]
pub trait LogViewerFactory: Send + Sync {
    /// Starts a browser session already showing the log page.
    async fn open(&self) -> error_stack::Result<Box<dyn LogViewer>, LogViewerError>;
}
