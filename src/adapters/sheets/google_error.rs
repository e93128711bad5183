use error_stack::{report, Report};
use google_sheets4::Error as Sheets4Error;

use crate::ports::log_sheet::SheetsError;

/// HTTP status carried by a failed API call, if any.
pub fn status_code(error: &Sheets4Error) -> Option<u16> {
    match error {
        Sheets4Error::BadRequest(body) => body["error"]["code"]
            .as_u64()
            .and_then(|code| u16::try_from(code).ok()),
        Sheets4Error::Failure(response) => Some(response.status().as_u16()),
        _ => None,
    }
}

pub fn classify_status(
    status: Option<u16>,
    not_found: SheetsError,
    fallback: SheetsError,
) -> SheetsError {
    match status {
        Some(401) | Some(403) => SheetsError::PermissionDenied,
        Some(404) => not_found,
        _ => fallback,
    }
}

pub fn sheets_report(
    error: Sheets4Error,
    not_found: SheetsError,
    fallback: SheetsError,
) -> Report<SheetsError> {
    let context = classify_status(status_code(&error), not_found, fallback);
    report!(error).change_context(context)
}
