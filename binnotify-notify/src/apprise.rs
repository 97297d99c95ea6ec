use reqwest::Client;
use serde::Serialize;
use tracing::info;

use binnotify_core::ports::NotifyError;

use crate::ensure_success;

/// JSON payload accepted by an Apprise API `/notify/{key}` endpoint.
#[derive(Debug, Serialize)]
struct AppriseRequest<'a> {
    urls: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
}

/// Sends push notifications through an Apprise API server.
pub struct AppriseClient {
    client: Client,
}

impl AppriseClient {
    /// Create a client bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Post `body` to the Apprise endpoint at `url`.
    ///
    /// In dry-run mode the notification is only logged.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] when the request fails or Apprise answers with
    /// a non-success status.
    pub async fn send_notification(
        &self,
        url: &str,
        body: &str,
        tag: Option<&str>,
        dry_run: bool,
    ) -> Result<(), NotifyError> {
        if dry_run {
            info!(url, body, tag, "DRY RUN: would have sent notification");
            return Ok(());
        }

        let response = self
            .client
            .post(url)
            .json(&AppriseRequest {
                urls: url,
                body,
                tag,
            })
            .send()
            .await?;

        ensure_success(response).await?;
        info!(url, "notification sent via Apprise");
        Ok(())
    }
}
