//! Notification channels for bin-notifier: Twilio SMS and Apprise webhooks.

/// Apprise API webhook client.
pub mod apprise;
/// Twilio SMS client.
pub mod twilio;

use async_trait::async_trait;
use reqwest::Response;
use tracing::{debug, info};

use binnotify_core::{
    model::Recipient,
    ports::{NotificationPort, NotifyError},
};

pub use apprise::AppriseClient;
pub use twilio::{TwilioClient, TwilioCredentials};

/// Routes each recipient to the client for its channel.
///
/// A dry run never fails, even for a channel with no client configured.
#[derive(Default)]
pub struct ChannelNotifier {
    sms: Option<TwilioClient>,
    webhook: Option<AppriseClient>,
}

impl ChannelNotifier {
    /// Notifier with no channels configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `client` for [`Recipient::Sms`].
    #[must_use]
    pub fn with_sms(mut self, client: TwilioClient) -> Self {
        self.sms = Some(client);
        self
    }

    /// Use `client` for [`Recipient::Webhook`].
    #[must_use]
    pub fn with_webhook(mut self, client: AppriseClient) -> Self {
        self.webhook = Some(client);
        self
    }
}

#[async_trait]
impl NotificationPort for ChannelNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        body: &str,
        dry_run: bool,
    ) -> Result<(), NotifyError> {
        match (recipient, &self.sms, &self.webhook) {
            (Recipient::Sms { from, to }, Some(client), _) => {
                client.send_sms(from, to, body, dry_run).await
            }
            (Recipient::Webhook { url, tag }, _, Some(client)) => {
                client
                    .send_notification(url, body, tag.as_deref(), dry_run)
                    .await
            }
            _ if dry_run => {
                info!(?recipient, body, "DRY RUN: would have sent notification");
                Ok(())
            }
            _ => Err(NotifyError::UnsupportedChannel),
        }
    }
}

// Turn a non-2xx response into an error carrying the response body.
async fn ensure_success(response: Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(%err, %status, "could not read error response body");
            String::new()
        }
    };
    Err(NotifyError::Status { status, body })
}
