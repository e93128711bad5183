use error_stack::{report, ResultExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::ports::log_sheet::SheetsError;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Minimal Drive v3 client, only used to find spreadsheets by title.
#[derive(Debug, Clone, Default)]
pub struct DriveClient {
    client: Client,
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn spreadsheet_query(name: Option<&str>) -> String {
    let mut query = format!("mimeType='{}' and trashed=false", SPREADSHEET_MIME_TYPE);
    if let Some(name) = name {
        query.push_str(&format!(" and name='{}'", escape_query_literal(name)));
    }
    query
}

impl DriveClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, token))]
    pub async fn list_spreadsheets(
        &self,
        token: &str,
        name: Option<&str>,
    ) -> error_stack::Result<Vec<DriveFile>, SheetsError> {
        let query = spreadsheet_query(name);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.clone()),
                ("fields", "nextPageToken, files(id, name)".to_string()),
                ("pageSize", "1000".to_string()),
                ("supportsAllDrives", "true".to_string()),
                ("includeItemsFromAllDrives", "true".to_string()),
            ];
            if let Some(page_token) = page_token.take() {
                params.push(("pageToken", page_token));
            }

            let response = self
                .client
                .get(DRIVE_FILES_URL)
                .bearer_auth(token)
                .query(&params)
                .send()
                .await
                .change_context(SheetsError::FailedToListSpreadsheets)?;

            let status = response.status();
            if status == reqwest::StatusCode::FORBIDDEN
                || status == reqwest::StatusCode::UNAUTHORIZED
            {
                let body = response.text().await.unwrap_or_default();
                return Err(report!(SheetsError::PermissionDenied))
                    .attach_printable(format!("Drive API responded {}: {}", status, body))
                    .attach_printable("Is the Google Drive API enabled for this project?");
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(report!(SheetsError::FailedToListSpreadsheets))
                    .attach_printable(format!("Drive API responded {}: {}", status, body));
            }

            let page: FileList = response
                .json()
                .await
                .change_context(SheetsError::FailedToListSpreadsheets)?;

            tracing::debug!(count = page.files.len(), "Fetched spreadsheet page");
            files.extend(page.files);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_without_name() {
        assert_eq!(
            spreadsheet_query(None),
            "mimeType='application/vnd.google-apps.spreadsheet' and trashed=false"
        );
    }

    #[test]
    fn test_query_with_name_escapes_quotes() {
        assert_eq!(
            spreadsheet_query(Some("Bob's \\ Log")),
            "mimeType='application/vnd.google-apps.spreadsheet' and trashed=false and name='Bob\\'s \\\\ Log'"
        );
    }

    #[test]
    fn test_file_list_deserialize() {
        let page: FileList = serde_json::from_str(
            r#"{"files":[{"id":"1","name":"Log Data"}],"nextPageToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(
            page.files,
            vec![DriveFile {
                id: "1".to_string(),
                name: "Log Data".to_string()
            }]
        );
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));

        let empty: FileList = serde_json::from_str("{}").unwrap();
        assert!(empty.files.is_empty());
        assert_eq!(empty.next_page_token, None);
    }
}
