use std::path::Path;

use error_stack::{report, ResultExt};
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use super::http_client::{HttpClient, HttpsConnector};
use crate::ports::log_sheet::SheetsError;

pub type SheetsAuthenticator = Authenticator<HttpsConnector>;

#[instrument]
pub async fn read_service_account_key(
    credentials_file: &str,
) -> error_stack::Result<oauth2::ServiceAccountKey, SheetsError> {
    if !Path::new(credentials_file).exists() {
        return Err(report!(SheetsError::CredentialsNotFound(
            credentials_file.to_string()
        )));
    }
    tracing::info!("✓ Found credentials file: {}", credentials_file);

    oauth2::read_service_account_key(credentials_file)
        .await
        .change_context(SheetsError::InvalidCredentials)
        .attach_printable_lazy(|| {
            format!(
                "Could not read service account private key at '{}'",
                credentials_file
            )
        })
}

#[instrument(skip(secret, client), fields(client_email = %secret.client_email))]
pub async fn auth(
    secret: oauth2::ServiceAccountKey,
    client: HttpClient,
) -> error_stack::Result<SheetsAuthenticator, SheetsError> {
    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SheetsError::AuthenticatorFailed)
}
