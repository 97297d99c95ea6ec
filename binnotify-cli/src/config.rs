//! YAML configuration file: raw shape, validation, and conversion into the
//! core model.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use binnotify_core::{
    dates::parse_weekday,
    model::{CollectionDay, Location, Recipient, ScheduleError, ScraperId},
};
use chrono::{NaiveDate, ParseError as ChronoParseError};
use serde::{Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug)]
/// Problems with the configuration file.
pub(crate) enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("at least one location must be configured")]
    NoLocations,
    #[error("location #{index}: {field} must not be empty")]
    MissingField { index: usize, field: &'static str },
    #[error("location {label:?}: at least one collection day must be configured")]
    NoCollectionDays { label: String },
    #[error("location {label:?}, collection day #{rule}: {source}")]
    Schedule {
        label: String,
        rule: usize,
        #[source]
        source: ScheduleError,
    },
    #[error("location {label:?}, collection day #{rule}: invalid reference_date {value:?}: {source}")]
    InvalidReferenceDate {
        label: String,
        rule: usize,
        value: String,
        #[source]
        source: ChronoParseError,
    },
    #[error("notifier: {0} must not be empty")]
    MissingRecipient(&'static str),
}

/// Validated configuration.
#[derive(Debug)]
pub(crate) struct Config {
    pub recipient: Recipient,
    pub locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    notifier: NotifierConfig,
    #[serde(default)]
    locations: Vec<LocationConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum NotifierConfig {
    Sms {
        #[serde(default)]
        from: String,
        #[serde(default)]
        to: String,
    },
    Webhook {
        #[serde(default)]
        url: String,
        #[serde(default)]
        tag: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct LocationConfig {
    #[serde(default)]
    label: String,
    #[serde(default)]
    scraper: String,
    #[serde(default)]
    postcode: String,
    #[serde(default, deserialize_with = "string_or_number")]
    address_code: String,
    #[serde(default)]
    collection_days: Vec<CollectionDayConfig>,
}

#[derive(Debug, Deserialize)]
struct CollectionDayConfig {
    day: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    every_n_weeks: u32,
    #[serde(default)]
    reference_date: Option<String>,
}

// Address codes are often bare numbers in YAML.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(u64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Integer(number) => number.to_string(),
    })
}

/// Read, parse, and validate the file at `path`.
pub(crate) fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    from_yaml_str(&raw)
}

/// Parse and validate configuration from YAML text.
pub(crate) fn from_yaml_str(raw: &str) -> Result<Config, ConfigError> {
    let file: FileConfig = serde_yaml::from_str(raw)?;
    file.validate()
}

impl FileConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let recipient = self.notifier.into_recipient()?;

        if self.locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }

        let locations = self
            .locations
            .into_iter()
            .enumerate()
            .map(|(index, location)| location.into_location(index + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            recipient,
            locations,
        })
    }
}

impl NotifierConfig {
    fn into_recipient(self) -> Result<Recipient, ConfigError> {
        match self {
            NotifierConfig::Sms { from, to } => {
                let from = required(from, ConfigError::MissingRecipient("from"))?;
                let to = required(to, ConfigError::MissingRecipient("to"))?;
                Ok(Recipient::Sms { from, to })
            }
            NotifierConfig::Webhook { url, tag } => {
                let url = required(url, ConfigError::MissingRecipient("url"))?;
                let tag = tag.filter(|tag| !tag.trim().is_empty());
                Ok(Recipient::Webhook { url, tag })
            }
        }
    }
}

impl LocationConfig {
    fn into_location(self, index: usize) -> Result<Location, ConfigError> {
        let missing = |field| ConfigError::MissingField { index, field };

        let label = required(self.label, missing("label"))?;
        let scraper = required(self.scraper, missing("scraper"))?;
        let postcode = required(self.postcode, missing("postcode"))?;
        let address_code = required(self.address_code, missing("address_code"))?;

        if self.collection_days.is_empty() {
            return Err(ConfigError::NoCollectionDays { label });
        }

        let collection_days = self
            .collection_days
            .into_iter()
            .enumerate()
            .map(|(rule, day)| day.into_collection_day(&label, rule + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Location {
            label,
            scraper: ScraperId(scraper),
            postcode,
            address_code,
            collection_days,
        })
    }
}

impl CollectionDayConfig {
    fn into_collection_day(self, label: &str, rule: usize) -> Result<CollectionDay, ConfigError> {
        let schedule_error = |source| ConfigError::Schedule {
            label: label.to_owned(),
            rule,
            source,
        };

        let weekday = parse_weekday(self.day.trim()).map_err(schedule_error)?;

        let reference_date = self
            .reference_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| {
                    ConfigError::InvalidReferenceDate {
                        label: label.to_owned(),
                        rule,
                        value: value.to_owned(),
                        source,
                    }
                })
            })
            .transpose()?;

        let types = self
            .types
            .into_iter()
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty());

        CollectionDay::new(weekday, types, self.every_n_weeks, reference_date).map_err(schedule_error)
    }
}

fn required(value: String, err: ConfigError) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_owned())
}
