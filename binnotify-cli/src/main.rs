//! Command line runner: checks tomorrow's bin collections for every configured
//! location and sends a reminder or a missing-collection warning.

mod cli;
mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use reqwest::Client;
use tracing::{debug, error, info};

use binnotify_core::{
    dates::CalendarDate,
    model::Recipient,
    plugin::ScraperRegistry,
    service::{NotificationResult, NotificationService, RunContext, has_errors},
};
use binnotify_notify::{AppriseClient, ChannelNotifier, TwilioClient, TwilioCredentials};
use binnotify_scraper_bracknell as bracknell;
use binnotify_scraper_wokingham as wokingham;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init_logging();
    // Twilio credentials may live in a .env file next to the config.
    if let Err(err) = dotenvy::dotenv() {
        debug!(%err, "no .env file loaded");
    }

    let cli = Cli::parse();
    let config = config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // HTTP + service setup
    let client = Client::builder().user_agent("bin-notifier/0.1").build()?;

    let registry = Arc::new(ScraperRegistry::new(vec![
        bracknell::plugin(client.clone()),
        wokingham::plugin(client.clone()),
    ]));
    let notifier = build_notifier(&config.recipient, client, cli.dry_run)?;
    let service = NotificationService::new(registry, Arc::new(notifier));

    let context = RunContext {
        // The UTC calendar date the local clock falls on.
        today: Local::now().utc_date(),
        today_override: cli.today_override(),
        locations: config.locations,
        recipient: config.recipient,
        dry_run: cli.dry_run,
    };

    let results = service.run(&context).await;
    report(&results);

    if has_errors(&results) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn build_notifier(recipient: &Recipient, client: Client, dry_run: bool) -> Result<ChannelNotifier> {
    let notifier = match recipient {
        Recipient::Sms { .. } => {
            let credentials = if dry_run {
                TwilioCredentials::from_env().ok()
            } else {
                Some(TwilioCredentials::from_env().context("Twilio credentials are required")?)
            };
            ChannelNotifier::new().with_sms(TwilioClient::new(client, credentials))
        }
        Recipient::Webhook { .. } => ChannelNotifier::new().with_webhook(AppriseClient::new(client)),
    };
    Ok(notifier)
}

fn report(results: &[NotificationResult]) {
    for result in results {
        match &result.error {
            Some(err) => error!(location = %result.label, "{err}"),
            None if result.sent => info!(location = %result.label, message = %result.message, "notified"),
            None => info!(location = %result.label, "nothing to send"),
        }
    }
}
