//! Traits describing the scraper and notifier collaborators.

use async_trait::async_trait;
use reqwest::{Error as ReqwestError, StatusCode};

use crate::model::{CollectionEvent, Recipient, ScraperId};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while scraping a council website.
pub enum ScrapeError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Page content could not be turned into collection events.
    #[error("{0}")]
    Parse(String),
    /// Caller passed an empty postcode.
    #[error("no postcode specified")]
    MissingPostcode,
    /// Caller passed an empty address code.
    #[error("no address specified")]
    MissingAddress,
    /// Page loaded but listed no collections.
    #[error("no collections found on the council page")]
    NoCollections,
    /// No scraper is registered under the requested name.
    #[error("unknown scraper: {0}")]
    UnknownScraper(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while delivering a notification.
pub enum NotifyError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Delivery endpoint answered with a non-success status.
    #[error("notification endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Credentials for the delivery channel are not configured.
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),
    /// No client is configured for the recipient's channel.
    #[error("no notifier configured for this recipient")]
    UnsupportedChannel,
}

/// Reject empty scraper inputs before any request is made.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingPostcode`] or [`ScrapeError::MissingAddress`],
/// checking the postcode first.
pub fn validate_scrape_input(postcode: &str, address_code: &str) -> Result<(), ScrapeError> {
    if postcode.trim().is_empty() {
        return Err(ScrapeError::MissingPostcode);
    }
    if address_code.trim().is_empty() {
        return Err(ScrapeError::MissingAddress);
    }
    Ok(())
}

#[async_trait]
/// Trait for council-specific collection scrapers.
pub trait CollectionScraper: Send + Sync {
    /// Name the scraper is registered under.
    fn id(&self) -> &ScraperId;

    /// Fetch upcoming collections for an address.
    ///
    /// An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns a [`ScrapeError`] when the inputs are empty, the council site
    /// cannot be reached, or its content cannot be parsed.
    async fn scrape(
        &self,
        postcode: &str,
        address_code: &str,
    ) -> Result<Vec<CollectionEvent>, ScrapeError>;
}

#[async_trait]
/// Trait for notification delivery channels.
pub trait NotificationPort: Send + Sync {
    /// Deliver one message to a recipient.
    ///
    /// With `dry_run` set, implementations must not touch the network and
    /// report success.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] when delivery fails.
    async fn send(&self, recipient: &Recipient, body: &str, dry_run: bool)
    -> Result<(), NotifyError>;
}
