use std::{fmt::Debug, time::Duration};

use error_stack::{Result, ResultExt};
use fantoccini::{elements::Element, Locator};
use tracing::{event, instrument, Level};

use super::fantoccini_scraper_driver::FantocciniScraperDriver;
use crate::adapters::config::scraping_config::ScrapingConfig;
use crate::ports::log_viewer::{LogViewer, LogViewerError, LogViewerFactory, RawMatch};

const SEARCH_INPUT_SELECTOR: &str = "input[placeholder='Search']";
const NEXT_MATCH_SELECTOR: &str = "button[aria-label='go to next match']";
const MATCH_COUNTER_SELECTOR: &str = "span.ml-8.font-semibold";
const LINE_NUMBER_SELECTOR: &str = "span[aria-label='line number']";
const LINE_TEXT_SELECTOR: &str = "span.break-all";
const ROW_XPATH: &str = "./ancestor::div[@role='row']";
const HIGHLIGHT_STYLE: &str = "background-color:rgb(255,215,0)";

const SCROLL_INTO_VIEW_SCRIPT: &str =
    "arguments[0].scrollIntoView({behavior: 'auto', block: 'center'});";
const CLICK_SCRIPT: &str = "arguments[0].click();";

/// Pauses giving the page time to re-render after an interaction.
#[derive(Debug, Clone)]
pub struct SettleDelays {
    pub after_load: Duration,
    pub after_typing: Duration,
    pub after_search: Duration,
    pub before_match: Duration,
    pub after_scroll: Duration,
    pub after_click: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            after_load: Duration::from_secs(3),
            after_typing: Duration::from_secs(1),
            after_search: Duration::from_secs(2),
            before_match: Duration::from_millis(500),
            after_scroll: Duration::from_millis(300),
            after_click: Duration::from_millis(500),
        }
    }
}

/// XPath string literal for arbitrary text.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts = text
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect::<Vec<_>>()
            .join(", \"'\", ");
        format!("concat({})", parts)
    }
}

/// XPath of the highlighted span containing `marker`. Without a colour the
/// lookup accepts any highlighted span.
pub fn highlighted_match_xpath(marker: &str, colour: Option<&str>) -> String {
    let style = colour.unwrap_or("background-color");
    format!(
        "//span[contains(@style,{}) and contains(., {})]",
        xpath_literal(style),
        xpath_literal(marker)
    )
}

pub struct FantocciniLogViewer {
    driver: FantocciniScraperDriver,
    wait_timeout: Duration,
    delays: SettleDelays,
}

impl Debug for FantocciniLogViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantocciniLogViewer").finish()
    }
}

impl FantocciniLogViewer {
    async fn wait_for(&self, locator: Locator<'_>) -> Result<Element, LogViewerError> {
        self.driver
            .client
            .wait()
            .at_most(self.wait_timeout)
            .for_element(locator)
            .await
            .change_context(LogViewerError::MatchNotFound)
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), LogViewerError> {
        let argument =
            serde_json::to_value(element).change_context(LogViewerError::MatchNotFound)?;
        self.driver
            .client
            .execute(SCROLL_INTO_VIEW_SCRIPT, vec![argument])
            .await
            .change_context(LogViewerError::MatchNotFound)?;
        tokio::time::sleep(self.delays.after_scroll).await;
        Ok(())
    }

    async fn find_highlighted(&self, marker: &str) -> Result<Element, LogViewerError> {
        let exact = highlighted_match_xpath(marker, Some(HIGHLIGHT_STYLE));
        match self.wait_for(Locator::XPath(&exact)).await {
            Ok(element) => Ok(element),
            Err(_) => {
                tracing::trace!("Exact highlight colour not found, trying any highlight");
                let fallback = highlighted_match_xpath(marker, None);
                self.wait_for(Locator::XPath(&fallback))
                    .await
                    .attach_printable_lazy(|| format!("No highlighted line contains '{}'", marker))
            }
        }
    }
}

#[async_trait::async_trait]
impl LogViewer for FantocciniLogViewer {
    #[instrument(skip(self))]
    async fn reload(&self) -> Result<(), LogViewerError> {
        event!(Level::DEBUG, "Refreshing page...");
        self.driver
            .client
            .refresh()
            .await
            .change_context(LogViewerError::ReloadFailed)?;
        tokio::time::sleep(self.delays.after_load).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<(), LogViewerError> {
        let input = self
            .wait_for(Locator::Css(SEARCH_INPUT_SELECTOR))
            .await
            .change_context(LogViewerError::SearchFailed)
            .attach_printable("Search input not found")?;

        input.clear().await.change_context(LogViewerError::SearchFailed)?;
        input
            .send_keys(query)
            .await
            .change_context(LogViewerError::SearchFailed)?;
        event!(Level::DEBUG, "Search query typed, waiting for page to update");
        tokio::time::sleep(self.delays.after_typing).await;

        self.wait_for(Locator::Css(NEXT_MATCH_SELECTOR))
            .await
            .change_context(LogViewerError::SearchFailed)?
            .click()
            .await
            .change_context(LogViewerError::SearchFailed)
            .attach_printable("Failed to jump to the first match")?;
        tokio::time::sleep(self.delays.after_search).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_match(&self, marker: &str) -> Result<RawMatch, LogViewerError> {
        tokio::time::sleep(self.delays.before_match).await;

        let highlighted = self.find_highlighted(marker).await?;
        self.scroll_into_view(&highlighted).await?;

        let row = highlighted
            .find(Locator::XPath(ROW_XPATH))
            .await
            .change_context(LogViewerError::MatchContentUnavailable)
            .attach_printable("Highlighted span is not inside a log row")?;

        let line_number = row
            .find(Locator::Css(LINE_NUMBER_SELECTOR))
            .await
            .change_context(LogViewerError::MatchContentUnavailable)?
            .text()
            .await
            .change_context(LogViewerError::MatchContentUnavailable)?;

        let text = row
            .find(Locator::Css(LINE_TEXT_SELECTOR))
            .await
            .change_context(LogViewerError::MatchContentUnavailable)?
            .text()
            .await
            .change_context(LogViewerError::MatchContentUnavailable)?;

        Ok(RawMatch { line_number, text })
    }

    #[instrument(skip(self))]
    async fn match_counter(&self) -> Option<String> {
        let counter = self
            .wait_for(Locator::Css(MATCH_COUNTER_SELECTOR))
            .await
            .ok()?;
        counter.text().await.ok().map(|text| text.trim().to_string())
    }

    #[instrument(skip(self))]
    async fn next_match(&self) -> Result<(), LogViewerError> {
        let button = self
            .wait_for(Locator::Css(NEXT_MATCH_SELECTOR))
            .await
            .change_context(LogViewerError::NextMatchFailed)?;

        self.scroll_into_view(&button)
            .await
            .change_context(LogViewerError::NextMatchFailed)?;

        if let Err(error) = button.click().await {
            tracing::debug!("Native click failed ({}), clicking through JavaScript", error);
            let argument =
                serde_json::to_value(&button).change_context(LogViewerError::NextMatchFailed)?;
            self.driver
                .client
                .execute(CLICK_SCRIPT, vec![argument])
                .await
                .change_context(LogViewerError::NextMatchFailed)?;
        }

        tokio::time::sleep(self.delays.after_click).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close(&self) {
        self.driver.close().await;
    }
}

/// Launches a browser through the configured webdriver and opens the log
/// page.
#[derive(Debug, Clone)]
pub struct FantocciniLogViewerFactory {
    config: ScrapingConfig,
    delays: SettleDelays,
}

impl FantocciniLogViewerFactory {
    pub fn new(config: ScrapingConfig) -> Self {
        Self {
            config,
            delays: SettleDelays::default(),
        }
    }
}

#[async_trait::async_trait]
impl LogViewerFactory for FantocciniLogViewerFactory {
    #[instrument(skip(self), fields(url = %self.config.url))]
    async fn open(&self) -> Result<Box<dyn LogViewer>, LogViewerError> {
        let driver = FantocciniScraperDriver::new(&self.config.webdriver, self.config.headless)
            .await
            .change_context(LogViewerError::OpenFailed)?;

        event!(Level::DEBUG, "Opening log page");
        if let Err(error) = driver.client.goto(&self.config.url).await {
            driver.close().await;
            return Err(error)
                .change_context(LogViewerError::OpenFailed)
                .attach_printable_lazy(|| format!("Failed to navigate to {}", self.config.url));
        }
        tokio::time::sleep(self.delays.after_load).await;

        Ok(Box::new(FantocciniLogViewer {
            driver,
            wait_timeout: Duration::from_secs(self.config.wait_timeout_secs),
            delays: self.delays.clone(),
        }))
    }
}
