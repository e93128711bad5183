use std::collections::HashSet;

use error_stack::ResultExt;
use tracing::instrument;

use super::settings::ScrapeSettings;
use crate::domain::log_entry::{LogEntry, LogLineParser};
use crate::domain::match_counter::MatchCounter;
use crate::ports::log_viewer::LogViewer;
use crate::ports::routine::RoutineError;

/// Walks every search match of the viewer once, in order.
///
/// The walk ends on the last match reported by the counter, when the next
/// button stops working, or after `max_matches` steps. Lines are
/// deduplicated by line number. A failed search yields no entries.
#[instrument(skip_all, fields(query = %settings.search_query))]
pub async fn scrape_matches(
    viewer: &dyn LogViewer,
    settings: &ScrapeSettings,
) -> error_stack::Result<Vec<LogEntry>, RoutineError> {
    tracing::info!(
        "Starting data scrape at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    viewer
        .reload()
        .await
        .change_context(RoutineError::routine_failure("Could not reload the log page"))?;

    if let Err(report) = viewer.search(&settings.search_query).await {
        tracing::error!("Error setting up search: {:?}", report);
        return Ok(Vec::new());
    }

    let parser = LogLineParser::new(&settings.match_marker);
    let max_matches = settings.max_matches.max(1);
    let mut processed_line_numbers = HashSet::new();
    let mut results = Vec::new();

    for match_index in 1..=max_matches {
        tracing::debug!("Processing match #{}...", match_index);

        match viewer.current_match(&settings.match_marker).await {
            Ok(raw) => {
                let line_number = raw.line_number.trim().to_string();
                if processed_line_numbers.insert(line_number.clone()) {
                    let entry = parser.parse(&line_number, &raw.text);
                    tracing::info!(
                        "✓ Extracted line {}: {}...",
                        entry.line_number,
                        entry.preview(50)
                    );
                    results.push(entry);
                } else {
                    tracing::debug!("Skipping duplicate line {}", line_number);
                }
            }
            Err(report) => tracing::warn!("Error finding current element: {:?}", report),
        }

        match viewer.match_counter().await {
            Some(text) => match text.parse::<MatchCounter>() {
                Ok(counter) if counter.is_last() => {
                    tracing::info!("Reached last match ({}). Finished collecting.", counter);
                    break;
                }
                Ok(counter) => tracing::debug!("Match {} - continuing...", counter),
                Err(error) => tracing::warn!("Unreadable match counter: {}", error),
            },
            None => tracing::warn!("Could not find match counter"),
        }

        if match_index == max_matches {
            tracing::warn!(
                "Stopped after {} matches without reaching the last one",
                max_matches
            );
            break;
        }

        if let Err(report) = viewer.next_match().await {
            tracing::info!(
                "Could not find or click next button: {:?}. Finished collecting.",
                report
            );
            break;
        }
    }

    tracing::info!(
        "Scraping complete! Found {} matching elements.",
        results.len()
    );
    Ok(results)
}
