use std::path::PathBuf;

use clap::Parser;

/// Check tomorrow's bin collections and send a reminder.
#[derive(Debug, Parser)]
#[command(name = "bin-notifier", version, about)]
pub(crate) struct Cli {
    /// YAML file describing locations and the notification channel
    #[arg(
        short = 'c',
        long = "config",
        env = "BN_CONFIG_FILE",
        default_value = "config.yaml"
    )]
    pub config: PathBuf,

    /// Run everything, but only log the notifications instead of sending them
    #[arg(short = 'x', long = "dry-run", env = "BN_DRY_RUN")]
    pub dry_run: bool,

    /// Date to use as today, as YYYY-MM-DD
    #[arg(short = 'd', long = "today-date", env = "BN_TODAY_DATE")]
    pub today_date: Option<String>,
}

impl Cli {
    /// The `today` override, with an empty value meaning none.
    pub(crate) fn today_override(&self) -> Option<String> {
        self.today_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }
}
