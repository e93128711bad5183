use error_stack::ResultExt;
use indicatif::ProgressStyle;
use tracing::{instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::settings::UploadSettings;
use crate::domain::log_entry::LogEntry;
use crate::domain::sheets::log_rows::{existing_line_numbers, header_row, new_entries};
use crate::ports::log_sheet::LogSheet;
use crate::ports::routine::RoutineError;

/// Appends the entries whose line number is not yet in the sheet.
///
/// Entries whose message matches a skip pattern are dropped first. The
/// sheet is read once. An empty sheet gets the header row first. Rows
/// are appended in batches with a pause in between. Returns how many
/// entries were uploaded.
#[instrument(skip_all, fields(worksheet = sheet.title(), entries = entries.len()))]
pub async fn upload_new_entries(
    sheet: &dyn LogSheet,
    entries: &[LogEntry],
    settings: &UploadSettings,
    uploaded_at: &str,
) -> error_stack::Result<usize, RoutineError> {
    let entries = entries
        .iter()
        .filter(|entry| {
            let skip = entry.message_contains_any(settings.skip_message_patterns.as_slice());
            if skip {
                tracing::debug!("⏭ Skipping line {} (filtered message)", entry.line_number);
            }
            !skip
        })
        .cloned()
        .collect::<Vec<_>>();

    if entries.is_empty() {
        tracing::info!("No new data to upload.");
        return Ok(0);
    }

    tracing::info!("Reading existing data from Google Sheets...");
    let rows = sheet
        .read_all_rows()
        .await
        .change_context(RoutineError::routine_failure("Could not read existing rows"))?;

    let existing = existing_line_numbers(&rows);
    tracing::info!("Found {} existing entries in Google Sheets", existing.len());

    let to_upload = new_entries(&entries, &existing);
    if to_upload.is_empty() {
        tracing::info!("All data already exists in Google Sheets. No new entries to upload.");
        return Ok(0);
    }
    tracing::info!(
        "Found {} new entries to upload (out of {} total)",
        to_upload.len(),
        entries.len()
    );

    if rows.is_empty() {
        tracing::info!("Sheet is empty. Adding header row...");
        sheet
            .append_rows(&[header_row()])
            .await
            .change_context(RoutineError::routine_failure("Could not add header row"))?;
    }

    let rows_to_add = to_upload
        .iter()
        .map(|entry| entry.to_row(uploaded_at))
        .collect::<Vec<_>>();

    append_in_batches(sheet, &rows_to_add, settings).await?;

    tracing::info!(
        "✓✓✓ SUCCESS: Uploaded {} new entries to Google Sheets ✓✓✓",
        rows_to_add.len()
    );
    Ok(rows_to_add.len())
}

#[instrument(skip_all, fields(rows = rows.len()))]
async fn append_in_batches(
    sheet: &dyn LogSheet,
    rows: &[Vec<String>],
    settings: &UploadSettings,
) -> error_stack::Result<(), RoutineError> {
    let span = Span::current();
    span.pb_set_style(&ProgressStyle::default_bar());
    span.pb_set_length(rows.len() as u64);

    let batch_size = settings.batch_size.max(1);
    let batch_count = rows.len().div_ceil(batch_size);
    let mut total_uploaded = 0;

    for (index, batch) in rows.chunks(batch_size).enumerate() {
        tracing::debug!("Uploading batch {} ({} rows)...", index + 1, batch.len());
        sheet
            .append_rows(batch)
            .await
            .change_context(RoutineError::routine_failure("Could not append rows"))
            .attach_printable_lazy(|| {
                format!(
                    "Batch {} of {} failed after {} rows were uploaded",
                    index + 1,
                    batch_count,
                    total_uploaded
                )
            })?;

        total_uploaded += batch.len();
        span.pb_inc(batch.len() as u64);
        tracing::info!("  ✓ Uploaded {}/{} rows", total_uploaded, rows.len());

        if index + 1 < batch_count {
            tokio::time::sleep(settings.batch_delay).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::fakes::FakeSheet;
    use crate::domain::sheets::log_rows::HEADER;

    const NOW: &str = "2024-06-01 12:00:00";

    fn settings(batch_size: usize) -> UploadSettings {
        UploadSettings {
            batch_size,
            batch_delay: Duration::from_millis(1),
            skip_message_patterns: Vec::new(),
        }
    }

    fn entry(line_number: &str) -> LogEntry {
        LogEntry {
            line_number: line_number.to_string(),
            timestamp: Some("2024-06-01 11:59:00.000".to_string()),
            compression_id: Some("3".to_string()),
            message: Some(format!("message {}", line_number)),
            full_text: format!("full {}", line_number),
        }
    }

    #[tokio::test]
    async fn test_empty_sheet_gets_header_then_rows() {
        let sheet = FakeSheet::default();
        let entries = vec![entry("1"), entry("2")];

        let uploaded = upload_new_entries(&sheet, &entries, &settings(100), NOW)
            .await
            .unwrap();

        assert_eq!(uploaded, 2);
        let rows = sheet.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], HEADER.map(str::to_string).to_vec());
        assert_eq!(
            rows[1],
            vec![
                "1",
                "2024-06-01 11:59:00.000",
                "3",
                "message 1",
                "full 1",
                NOW
            ]
        );
    }

    #[tokio::test]
    async fn test_only_new_entries_are_appended() {
        let sheet = FakeSheet::with_rows(vec![
            HEADER.to_vec(),
            vec!["1", "", "", "", "", ""],
            vec!["3", "", "", "", "", ""],
        ]);
        let entries = vec![entry("1"), entry("2"), entry("3"), entry("4")];

        let uploaded = upload_new_entries(&sheet, &entries, &settings(100), NOW)
            .await
            .unwrap();

        assert_eq!(uploaded, 2);
        let first_column: Vec<_> = sheet.rows().iter().map(|row| row[0].clone()).collect();
        assert_eq!(first_column, vec!["Line Number", "1", "3", "2", "4"]);
        assert_eq!(sheet.append_calls(), vec![2]);
    }

    #[tokio::test]
    async fn test_nothing_new_appends_nothing() {
        let sheet = FakeSheet::with_rows(vec![HEADER.to_vec(), vec!["1"], vec!["2"]]);

        let uploaded =
            upload_new_entries(&sheet, &[entry("2"), entry("1")], &settings(100), NOW)
                .await
                .unwrap();

        assert_eq!(uploaded, 0);
        assert!(sheet.append_calls().is_empty());
    }

    #[tokio::test]
    async fn test_header_only_sheet_does_not_get_second_header() {
        let sheet = FakeSheet::with_rows(vec![HEADER.to_vec()]);

        upload_new_entries(&sheet, &[entry("1")], &settings(100), NOW)
            .await
            .unwrap();

        assert_eq!(sheet.append_calls(), vec![1]);
        assert_eq!(sheet.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_rows_are_batched() {
        let sheet = FakeSheet::default();
        let entries = (1..=7).map(|n| entry(&n.to_string())).collect::<Vec<_>>();

        let uploaded = upload_new_entries(&sheet, &entries, &settings(3), NOW)
            .await
            .unwrap();

        assert_eq!(uploaded, 7);
        // Header, then 3 + 3 + 1
        assert_eq!(sheet.append_calls(), vec![1, 3, 3, 1]);
    }

    #[tokio::test]
    async fn test_zero_batch_size_uploads_one_by_one() {
        let sheet = FakeSheet::with_rows(vec![HEADER.to_vec()]);

        upload_new_entries(&sheet, &[entry("1"), entry("2")], &settings(0), NOW)
            .await
            .unwrap();

        assert_eq!(sheet.append_calls(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_no_entries_does_not_touch_sheet() {
        let sheet = FakeSheet {
            fail_reads: true,
            ..Default::default()
        };

        let uploaded = upload_new_entries(&sheet, &[], &settings(100), NOW)
            .await
            .unwrap();

        assert_eq!(uploaded, 0);
    }

    #[tokio::test]
    async fn test_skip_patterns_drop_matching_messages() {
        let sheet = FakeSheet::with_rows(vec![HEADER.to_vec()]);
        let mut noisy = entry("2");
        noisy.message = Some("Compression data successfully sent to dashboard".to_string());
        let mut no_message = entry("3");
        no_message.message = None;

        let settings = UploadSettings {
            skip_message_patterns: vec![
                "Compression data successfully sent to dashboard".to_string(),
                "Uids:".to_string(),
            ],
            ..settings(100)
        };
        let uploaded =
            upload_new_entries(&sheet, &[entry("1"), noisy, no_message], &settings, NOW)
                .await
                .unwrap();

        assert_eq!(uploaded, 2);
        let first_column: Vec<_> = sheet.rows().iter().map(|row| row[0].clone()).collect();
        assert_eq!(first_column, vec!["Line Number", "1", "3"]);
    }

    #[tokio::test]
    async fn test_only_skipped_entries_does_not_touch_sheet() {
        let sheet = FakeSheet {
            fail_reads: true,
            ..Default::default()
        };
        let mut noisy = entry("1");
        noisy.message = Some("Uids: 4, 5".to_string());

        let settings = UploadSettings {
            skip_message_patterns: vec!["Uids:".to_string()],
            ..settings(100)
        };
        let uploaded = upload_new_entries(&sheet, &[noisy], &settings, NOW)
            .await
            .unwrap();

        assert_eq!(uploaded, 0);
        assert!(sheet.append_calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_is_an_error() {
        let sheet = FakeSheet {
            fail_reads: true,
            ..Default::default()
        };

        let result = upload_new_entries(&sheet, &[entry("1")], &settings(100), NOW).await;

        assert!(result.is_err());
        assert!(sheet.append_calls().is_empty());
    }

    #[tokio::test]
    async fn test_append_failure_is_an_error() {
        let sheet = FakeSheet {
            fail_appends: true,
            ..Default::default()
        };

        let result = upload_new_entries(&sheet, &[entry("1")], &settings(100), NOW).await;

        assert!(result.is_err());
    }
}
