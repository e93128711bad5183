//! In-memory port implementations for routine and service tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use error_stack::report;

use crate::domain::log_entry::LogEntry;
use crate::ports::log_sheet::{
    LogSheet, SheetCatalog, SheetsConnector, SheetsError, SpreadsheetSummary,
};
use crate::ports::log_viewer::{LogViewer, LogViewerError, LogViewerFactory, RawMatch};
use crate::ports::snapshot_store::{SnapshotError, SnapshotStore};

pub fn raw_match(line_number: &str, text: &str) -> RawMatch {
    RawMatch {
        line_number: line_number.to_string(),
        text: text.to_string(),
    }
}

/// Scripted search results. `None` entries fail the highlighted-line lookup.
/// Moving past the last match wraps around to the first one.
#[derive(Debug, Default)]
pub struct FakeViewer {
    matches: Vec<Option<RawMatch>>,
    show_counter: bool,
    fail_search: bool,
    fail_reload: bool,
    next_fails_at: Option<usize>,
    position: AtomicUsize,
    next_calls: AtomicUsize,
    reloads: AtomicUsize,
    searches: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl FakeViewer {
    pub fn new(matches: Vec<Option<RawMatch>>) -> Self {
        Self {
            matches,
            show_counter: true,
            ..Default::default()
        }
    }

    pub fn without_counter(mut self) -> Self {
        self.show_counter = false;
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn with_failing_reload(mut self) -> Self {
        self.fail_reload = true;
        self
    }

    pub fn with_next_failing_at(mut self, position: usize) -> Self {
        self.next_fails_at = Some(position);
        self
    }

    pub fn next_calls(&self) -> usize {
        self.next_calls.load(Ordering::SeqCst)
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LogViewer for FakeViewer {
    async fn reload(&self) -> error_stack::Result<(), LogViewerError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reload {
            return Err(report!(LogViewerError::ReloadFailed));
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> error_stack::Result<(), LogViewerError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.fail_search {
            return Err(report!(LogViewerError::SearchFailed));
        }
        self.position.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn current_match(&self, _marker: &str) -> error_stack::Result<RawMatch, LogViewerError> {
        let position = self.position.load(Ordering::SeqCst);
        self.matches
            .get(position)
            .cloned()
            .flatten()
            .ok_or_else(|| report!(LogViewerError::MatchNotFound))
    }

    async fn match_counter(&self) -> Option<String> {
        if !self.show_counter || self.matches.is_empty() {
            return None;
        }
        let position = self.position.load(Ordering::SeqCst);
        Some(format!("{} / {}", position + 1, self.matches.len()))
    }

    async fn next_match(&self) -> error_stack::Result<(), LogViewerError> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        let position = self.position.load(Ordering::SeqCst);
        if self.next_fails_at == Some(position) || self.matches.is_empty() {
            return Err(report!(LogViewerError::NextMatchFailed));
        }
        self.position
            .store((position + 1) % self.matches.len(), Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Hands out the same shared viewer on every `open`.
#[derive(Debug)]
pub struct FakeViewerFactory {
    pub viewer: Arc<FakeViewer>,
    pub opened: AtomicUsize,
}

impl FakeViewerFactory {
    pub fn new(viewer: FakeViewer) -> Self {
        Self {
            viewer: Arc::new(viewer),
            opened: AtomicUsize::new(0),
        }
    }
}

#[derive(Debug)]
struct SharedViewer(Arc<FakeViewer>);

#[async_trait::async_trait]
impl LogViewer for SharedViewer {
    async fn reload(&self) -> error_stack::Result<(), LogViewerError> {
        self.0.reload().await
    }

    async fn search(&self, query: &str) -> error_stack::Result<(), LogViewerError> {
        self.0.search(query).await
    }

    async fn current_match(&self, marker: &str) -> error_stack::Result<RawMatch, LogViewerError> {
        self.0.current_match(marker).await
    }

    async fn match_counter(&self) -> Option<String> {
        self.0.match_counter().await
    }

    async fn next_match(&self) -> error_stack::Result<(), LogViewerError> {
        self.0.next_match().await
    }

    async fn close(&self) {
        self.0.close().await
    }
}

#[async_trait::async_trait]
impl LogViewerFactory for FakeViewerFactory {
    async fn open(&self) -> error_stack::Result<Box<dyn LogViewer>, LogViewerError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SharedViewer(Arc::clone(&self.viewer))))
    }
}

#[derive(Debug, Default)]
pub struct FakeSheet {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub append_calls: Mutex<Vec<usize>>,
    pub fail_reads: bool,
    pub fail_appends: bool,
}

impl FakeSheet {
    pub fn with_rows(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: Mutex::new(
                rows.into_iter()
                    .map(|row| row.into_iter().map(str::to_string).collect())
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }

    pub fn append_calls(&self) -> Vec<usize> {
        self.append_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LogSheet for FakeSheet {
    fn title(&self) -> &str {
        "Sheet1"
    }

    async fn read_all_rows(&self) -> error_stack::Result<Vec<Vec<String>>, SheetsError> {
        if self.fail_reads {
            return Err(report!(SheetsError::FailedToFetchRange));
        }
        Ok(self.rows())
    }

    async fn append_rows(&self, rows: &[Vec<String>]) -> error_stack::Result<(), SheetsError> {
        if self.fail_appends {
            return Err(report!(SheetsError::FailedToAppendRows));
        }
        self.append_calls.lock().unwrap().push(rows.len());
        self.rows.lock().unwrap().extend(rows.iter().cloned());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeSnapshot {
    pub saved: Mutex<Vec<Vec<LogEntry>>>,
}

impl FakeSnapshot {
    pub fn saved(&self) -> Vec<Vec<LogEntry>> {
        self.saved.lock().unwrap().clone()
    }
}

impl SnapshotStore for FakeSnapshot {
    fn save(&self, entries: &[LogEntry]) -> error_stack::Result<(), SnapshotError> {
        self.saved.lock().unwrap().push(entries.to_vec());
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeCatalog {
    pub spreadsheets: Vec<SpreadsheetSummary>,
}

#[async_trait::async_trait]
impl SheetCatalog for FakeCatalog {
    fn client_email(&self) -> &str {
        "scraper@project.iam.gserviceaccount.com"
    }

    async fn list_spreadsheets(
        &self,
    ) -> error_stack::Result<Vec<SpreadsheetSummary>, SheetsError> {
        Ok(self.spreadsheets.clone())
    }
}

/// Either opens `sheet` or fails with `error`.
#[derive(Debug)]
pub struct FakeConnector {
    pub sheet: Option<Arc<FakeSheet>>,
    pub error: SheetsError,
    pub catalog: Option<Arc<FakeCatalog>>,
}

impl FakeConnector {
    pub fn with_sheet(sheet: Arc<FakeSheet>) -> Self {
        Self {
            sheet: Some(sheet),
            error: SheetsError::FailedToFetchRange,
            catalog: None,
        }
    }

    pub fn failing(error: SheetsError) -> Self {
        Self {
            sheet: None,
            error,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, spreadsheets: Vec<SpreadsheetSummary>) -> Self {
        self.catalog = Some(Arc::new(FakeCatalog { spreadsheets }));
        self
    }
}

#[async_trait::async_trait]
impl SheetsConnector for FakeConnector {
    async fn open_sheet(&self) -> error_stack::Result<Arc<dyn LogSheet>, SheetsError> {
        match &self.sheet {
            Some(sheet) => Ok(Arc::clone(sheet) as Arc<dyn LogSheet>),
            None => Err(report!(self.error.clone())),
        }
    }

    async fn catalog(&self) -> error_stack::Result<Arc<dyn SheetCatalog>, SheetsError> {
        match &self.catalog {
            Some(catalog) => Ok(Arc::clone(catalog) as Arc<dyn SheetCatalog>),
            None => Err(report!(self.error.clone())),
        }
    }
}
