//! Run orchestrator: scrape, decide, and notify for every configured location.

use std::sync::Arc;

use chrono::{NaiveDate, ParseError as ChronoParseError};
use tracing::{debug, info, warn};

use crate::engine::decide;
use crate::model::{Location, MessageKind, Recipient};
use crate::plugin::ScraperRegistry;
use crate::ports::{NotificationPort, NotifyError, ScrapeError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MESSAGE_SEPARATOR: &str = "; ";

#[derive(thiserror::Error, Debug)]
/// Failures recorded on a run result.
pub enum RunError {
    /// The `today` override could not be parsed; no location was processed.
    #[error("invalid today date {value:?}: {source}")]
    InvalidOverrideDate {
        /// Raw override as configured.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: ChronoParseError,
    },
    /// The location names a scraper that is not registered.
    #[error("[{label}] scraper error: {source}")]
    UnknownScraper {
        /// Location label.
        label: String,
        /// Lookup failure.
        #[source]
        source: ScrapeError,
    },
    /// The scraper returned an error.
    #[error("[{label}] scrape error: {source}")]
    ScrapeFailed {
        /// Location label.
        label: String,
        /// Scraper failure.
        #[source]
        source: ScrapeError,
    },
    /// A message could not be delivered; later messages for the location were
    /// not attempted.
    #[error("[{label}] delivery error: {source}")]
    DeliveryFailed {
        /// Location label.
        label: String,
        /// Notifier failure.
        #[source]
        source: NotifyError,
    },
}

/// Everything a single run needs.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The real current date.
    pub today: NaiveDate,
    /// `YYYY-MM-DD` date replacing `today`, for testing or backfill.
    pub today_override: Option<String>,
    /// Locations to process, in order.
    pub locations: Vec<Location>,
    /// Where notifications go.
    pub recipient: Recipient,
    /// Forwarded to the notifier; suppresses the real side effect.
    pub dry_run: bool,
}

impl RunContext {
    /// The date the run treats as today.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::InvalidOverrideDate`] when an override is present
    /// but is not a `YYYY-MM-DD` date.
    pub fn effective_today(&self) -> Result<NaiveDate, RunError> {
        match self.today_override.as_deref() {
            None => Ok(self.today),
            Some(value) => NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
                RunError::InvalidOverrideDate {
                    value: value.to_owned(),
                    source,
                }
            }),
        }
    }
}

/// Outcome of a run for one location.
#[derive(Debug)]
pub struct NotificationResult {
    /// Location label; empty for a run-level failure.
    pub label: String,
    /// Categories the scraper reported for tomorrow.
    pub matched_categories: Vec<String>,
    /// True when at least one message was delivered.
    pub sent: bool,
    /// Every attempted message, joined with `"; "`.
    pub message: String,
    /// Failure, if any.
    pub error: Option<RunError>,
}

impl NotificationResult {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            matched_categories: Vec::new(),
            sent: false,
            message: String::new(),
            error: None,
        }
    }

    fn failed(label: &str, error: RunError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(label)
        }
    }

    fn push_message(&mut self, body: &str) {
        if !self.message.is_empty() {
            self.message.push_str(MESSAGE_SEPARATOR);
        }
        self.message.push_str(body);
    }
}

/// True when any result carries an error.
#[must_use]
pub fn has_errors(results: &[NotificationResult]) -> bool {
    results.iter().any(|result| result.error.is_some())
}

/// Public entry point for running the collection check.
pub struct NotificationService {
    registry: Arc<ScraperRegistry>,
    notifier: Arc<dyn NotificationPort>,
}

impl NotificationService {
    /// Create a new service bound to the provided scrapers and notifier.
    #[must_use]
    pub fn new(registry: Arc<ScraperRegistry>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { registry, notifier }
    }

    /// Process every location in order and return one result per location.
    ///
    /// A failing location never stops the run. Only an invalid `today`
    /// override does, in which case the single returned result carries that
    /// error and no location is touched.
    pub async fn run(&self, context: &RunContext) -> Vec<NotificationResult> {
        let today = match context.effective_today() {
            Ok(today) => today,
            Err(err) => {
                warn!(error = %err, "aborting run before processing any location");
                return vec![NotificationResult::failed("", err)];
            }
        };

        info!(%today, locations = context.locations.len(), dry_run = context.dry_run, "starting run");

        let mut results = Vec::with_capacity(context.locations.len());
        for location in &context.locations {
            let result = self.process_location(context, location, today).await;
            if let Some(err) = &result.error {
                warn!(location = %location.label, error = %err, "location failed");
            }
            results.push(result);
        }
        results
    }

    async fn process_location(
        &self,
        context: &RunContext,
        location: &Location,
        today: NaiveDate,
    ) -> NotificationResult {
        let label = location.label.as_str();
        let mut result = NotificationResult::new(label);

        info!(
            location = label,
            address_code = %location.address_code,
            postcode = %location.postcode,
            "scraping bin times"
        );

        let scraper = match self.registry.resolve(&location.scraper) {
            Ok(scraper) => scraper,
            Err(source) => {
                return NotificationResult::failed(
                    label,
                    RunError::UnknownScraper {
                        label: label.to_owned(),
                        source,
                    },
                );
            }
        };

        let events = match scraper.scrape(&location.postcode, &location.address_code).await {
            Ok(events) => events,
            Err(source) => {
                return NotificationResult::failed(
                    label,
                    RunError::ScrapeFailed {
                        label: label.to_owned(),
                        source,
                    },
                );
            }
        };

        for event in &events {
            debug!(location = label, category = %event.category, date = %event.date, "next collection");
        }

        let messages = decide(location, &events, today);
        if messages.is_empty() {
            info!(
                location = label,
                "no collections tomorrow and not an expected collection day"
            );
            return result;
        }

        for message in messages {
            if let MessageKind::Collections { categories } = &message.kind {
                result.matched_categories.clone_from(categories);
            }
            info!(location = label, message = %message.body, "sending notification");
            result.push_message(&message.body);

            if let Err(source) = self
                .notifier
                .send(&context.recipient, &message.body, context.dry_run)
                .await
            {
                result.error = Some(RunError::DeliveryFailed {
                    label: label.to_owned(),
                    source,
                });
                break;
            }
            result.sent = true;
        }

        result
    }
}
