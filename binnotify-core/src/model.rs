//! Domain data structures for locations, schedule rules, and scraped collections.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Built-in council scrapers shipped with bin-notifier.
pub enum Councils {
    /// Bracknell Forest Council.
    Bracknell,
    /// Wokingham Borough Council.
    Wokingham,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Name of a scraper implementation, e.g. `"bracknell"`.
pub struct ScraperId(pub String);

impl ScraperId {
    /// Lowercased form used for registry lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.trim().to_lowercase()
    }
}

impl fmt::Display for ScraperId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for Councils {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Councils::Bracknell => "bracknell",
            Councils::Wokingham => "wokingham",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Councils> for ScraperId {
    fn from(council: Councils) -> Self {
        ScraperId(council.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A scraped collection of one waste category on one calendar date.
pub struct CollectionEvent {
    /// Waste category as the council names it, e.g. `"Recycling"`.
    pub category: String,
    /// Day of the collection.
    pub date: NaiveDate,
}

impl CollectionEvent {
    /// Construct a new event.
    #[must_use]
    pub fn new<S: Into<String>>(category: S, date: NaiveDate) -> Self {
        Self {
            category: category.into(),
            date,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Ways a configured collection schedule can be invalid.
pub enum ScheduleError {
    /// Weekday name is not one of the seven English weekdays.
    #[error("invalid weekday: {0:?}")]
    InvalidWeekday(String),
    /// Rule lists no waste categories.
    #[error("collection day must list at least one waste type")]
    EmptyCategories,
    /// Rotation longer than a week without an anchor date.
    #[error("reference_date is required when every_n_weeks is greater than 1")]
    MissingReferenceDate,
    /// Anchor date falls on a different weekday than the rule.
    #[error("reference_date {date} is a {actual}, expected {expected}")]
    ReferenceDateOffWeekday {
        /// The configured anchor date.
        date: NaiveDate,
        /// Weekday the rule is configured for.
        expected: Weekday,
        /// Weekday the anchor date actually falls on.
        actual: Weekday,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Recurring expectation: on this weekday, every Nth week, these categories
/// are collected.
pub struct CollectionDay {
    /// Day of the week the collection happens on.
    pub weekday: Weekday,
    /// Categories expected on that day, in configured order.
    pub expected_categories: Vec<String>,
    /// Rotation length in weeks; 1 means every week.
    pub every_n_weeks: u32,
    /// Anchor date for rotations longer than a week.
    pub reference_date: Option<NaiveDate>,
}

impl CollectionDay {
    /// Build a weekly rule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EmptyCategories`] when no category is given.
    pub fn weekly<I, S>(weekday: Weekday, categories: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(weekday, categories, 1, None)
    }

    /// Build a rule, validating its rotation settings.
    ///
    /// `every_n_weeks == 0` is treated as unset and becomes 1. Duplicate
    /// categories are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the category list is empty, or when a
    /// rotation longer than a week has no reference date or one that falls on
    /// another weekday.
    pub fn new<I, S>(
        weekday: Weekday,
        categories: I,
        every_n_weeks: u32,
        reference_date: Option<NaiveDate>,
    ) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expected_categories: Vec<String> = Vec::new();
        for category in categories {
            let category = category.into();
            if !expected_categories.contains(&category) {
                expected_categories.push(category);
            }
        }
        if expected_categories.is_empty() {
            return Err(ScheduleError::EmptyCategories);
        }

        let every_n_weeks = every_n_weeks.max(1);
        if every_n_weeks > 1 {
            let date = reference_date.ok_or(ScheduleError::MissingReferenceDate)?;
            if date.weekday() != weekday {
                return Err(ScheduleError::ReferenceDateOffWeekday {
                    date,
                    expected: weekday,
                    actual: date.weekday(),
                });
            }
        }

        Ok(Self {
            weekday,
            expected_categories,
            every_n_weeks,
            reference_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One monitored address.
pub struct Location {
    /// Human-friendly name used as the message prefix, e.g. `"Home"`.
    pub label: String,
    /// Scraper implementation responsible for this address.
    pub scraper: ScraperId,
    /// Postcode passed to the scraper.
    pub postcode: String,
    /// Council-specific address identifier passed to the scraper.
    pub address_code: String,
    /// Expected collection rules, in configured order.
    pub collection_days: Vec<CollectionDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Where and how notifications are delivered.
pub enum Recipient {
    /// Text message sent through an SMS gateway.
    Sms {
        /// Sending phone number.
        from: String,
        /// Destination phone number.
        to: String,
    },
    /// Push notification relayed through a webhook endpoint.
    Webhook {
        /// Endpoint receiving the notification.
        url: String,
        /// Optional tag used by the relay to select targets.
        tag: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a message was planned.
pub enum MessageKind {
    /// The scraper reported collections for tomorrow.
    Collections {
        /// Categories collected tomorrow, in scraped order.
        categories: Vec<String>,
    },
    /// A configured rule expected a collection tomorrow that the scraper did
    /// not report.
    MissingCollection {
        /// Weekday of tomorrow.
        weekday: Weekday,
        /// Categories the rule expected.
        categories: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A message the engine wants delivered.
pub struct PlannedMessage {
    /// Reason for the message.
    pub kind: MessageKind,
    /// Text handed to the notifier.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn zero_weeks_defaults_to_weekly() {
        let rule = CollectionDay::new(Weekday::Tue, ["General Waste"], 0, None)
            .expect("weekly rule needs no reference date");
        assert_eq!(rule.every_n_weeks, 1);
    }

    #[test]
    fn rotation_requires_reference_date() {
        let err = CollectionDay::new(Weekday::Fri, ["Recycling"], 2, None)
            .expect_err("fortnightly rule without anchor");
        assert_eq!(err, ScheduleError::MissingReferenceDate);
    }

    #[test]
    fn reference_date_must_fall_on_rule_weekday() {
        // 2026-01-02 is a Friday.
        let err = CollectionDay::new(Weekday::Thu, ["Recycling"], 2, Some(date(2026, 1, 2)))
            .expect_err("anchor on the wrong weekday");
        assert_eq!(
            err,
            ScheduleError::ReferenceDateOffWeekday {
                date: date(2026, 1, 2),
                expected: Weekday::Thu,
                actual: Weekday::Fri,
            }
        );
    }

    #[test]
    fn categories_must_not_be_empty() {
        let err = CollectionDay::weekly(Weekday::Mon, Vec::<String>::new())
            .expect_err("no categories");
        assert_eq!(err, ScheduleError::EmptyCategories);
    }

    #[test]
    fn duplicate_categories_keep_first_occurrence() {
        let rule = CollectionDay::weekly(Weekday::Mon, ["Glass", "Paper", "Glass"])
            .expect("valid rule");
        assert_eq!(rule.expected_categories, vec!["Glass", "Paper"]);
    }

    #[test]
    fn scraper_ids_normalise_for_lookup() {
        assert_eq!(ScraperId(" Bracknell ".into()).normalized(), "bracknell");
        assert_eq!(ScraperId::from(Councils::Wokingham).0, "wokingham");
    }
}
