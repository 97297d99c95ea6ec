//! Per-location decision: which messages to send about tomorrow.
//!
//! Scraped collections always win. When the council reports anything for
//! tomorrow, exactly one summary message is planned and the configured rules
//! are not consulted. Only when nothing is reported does each rule get a
//! chance to warn that an expected collection is missing.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::dates::{dates_match, is_on_rotation, weekday_name};
use crate::model::{CollectionDay, CollectionEvent, Location, MessageKind, PlannedMessage};

/// Plan the messages for one location, given what the scraper returned and
/// today's date.
///
/// Returns an empty list when there is nothing to say.
#[must_use]
pub fn decide(
    location: &Location,
    events: &[CollectionEvent],
    today: NaiveDate,
) -> Vec<PlannedMessage> {
    let Some(tomorrow) = today.succ_opt() else {
        return Vec::new();
    };

    let matched: Vec<String> = events
        .iter()
        .filter(|event| dates_match(&event.date, &tomorrow))
        .map(|event| event.category.clone())
        .collect();

    if !matched.is_empty() {
        let body = format!(
            "{}: Tomorrows bin collections are: {}",
            location.label,
            matched.join(", ")
        );
        return vec![PlannedMessage {
            kind: MessageKind::Collections { categories: matched },
            body,
        }];
    }

    location
        .collection_days
        .iter()
        .filter(|rule| expects_collection_on(rule, tomorrow, &location.label))
        .map(|rule| missing_collection(&location.label, rule, tomorrow))
        .collect()
}

fn expects_collection_on(rule: &CollectionDay, tomorrow: NaiveDate, label: &str) -> bool {
    if tomorrow.weekday() != rule.weekday {
        return false;
    }
    if rule.every_n_weeks <= 1 {
        return true;
    }

    let Some(reference) = rule.reference_date else {
        warn!(
            location = label,
            every_n_weeks = rule.every_n_weeks,
            "rotating collection day has no reference date, skipping"
        );
        return false;
    };

    let on_rotation = is_on_rotation(&reference, &tomorrow, i64::from(rule.every_n_weeks));
    debug!(
        location = label,
        %reference,
        %tomorrow,
        every_n_weeks = rule.every_n_weeks,
        on_rotation,
        "checked collection rotation"
    );
    on_rotation
}

fn missing_collection(label: &str, rule: &CollectionDay, tomorrow: NaiveDate) -> PlannedMessage {
    let weekday = tomorrow.weekday();
    let body = format!(
        "{label}: Expected {} collection tomorrow ({}) but none scheduled.",
        rule.expected_categories.join(", "),
        weekday_name(weekday)
    );
    PlannedMessage {
        kind: MessageKind::MissingCollection {
            weekday,
            categories: rule.expected_categories.clone(),
        },
        body,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::model::ScraperId;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn home(collection_days: Vec<CollectionDay>) -> Location {
        Location {
            label: "Home".into(),
            scraper: ScraperId("bracknell".into()),
            postcode: "RG12 1AB".into(),
            address_code: "123456".into(),
            collection_days,
        }
    }

    fn weekly(weekday: Weekday, categories: &[&str]) -> CollectionDay {
        CollectionDay::weekly(weekday, categories.iter().copied()).expect("valid rule")
    }

    fn fortnightly_friday() -> CollectionDay {
        // 2026-01-02 is a Friday.
        CollectionDay::new(Weekday::Fri, ["Recycling"], 2, Some(date(2026, 1, 2)))
            .expect("valid rotation")
    }

    // Tomorrow is Tuesday 2024-01-16.
    fn monday() -> NaiveDate {
        date(2024, 1, 15)
    }

    #[test]
    fn scraped_collection_tomorrow_produces_single_summary() {
        let location = home(vec![weekly(Weekday::Tue, &["General Waste"])]);
        let events = [CollectionEvent::new("Recycling", date(2024, 1, 16))];

        let messages = decide(&location, &events, monday());

        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages.first().map(|message| message.body.as_str()),
            Some("Home: Tomorrows bin collections are: Recycling")
        );
    }

    #[test]
    fn matched_categories_keep_scraped_order() {
        let location = home(vec![]);
        let events = [
            CollectionEvent::new("Recycling", date(2024, 1, 16)),
            CollectionEvent::new("Garden", date(2024, 1, 23)),
            CollectionEvent::new("General Waste", date(2024, 1, 16)),
        ];

        let messages = decide(&location, &events, monday());

        assert_eq!(
            messages,
            vec![PlannedMessage {
                kind: MessageKind::Collections {
                    categories: vec!["Recycling".into(), "General Waste".into()],
                },
                body: "Home: Tomorrows bin collections are: Recycling, General Waste".into(),
            }]
        );
    }

    #[test]
    fn missing_weekly_collection_warns() {
        let location = home(vec![weekly(Weekday::Tue, &["General Waste"])]);

        let messages = decide(&location, &[], monday());

        assert_eq!(
            messages.first().map(|message| message.body.as_str()),
            Some("Home: Expected General Waste collection tomorrow (Tuesday) but none scheduled.")
        );
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn other_weekday_stays_silent() {
        let location = home(vec![weekly(Weekday::Wed, &["General Waste"])]);
        assert!(decide(&location, &[], monday()).is_empty());
    }

    #[test]
    fn events_on_other_days_do_not_count_as_matched() {
        let location = home(vec![weekly(Weekday::Tue, &["General Waste"])]);
        let events = [CollectionEvent::new("General Waste", date(2024, 1, 23))];

        let messages = decide(&location, &events, monday());

        assert!(matches!(
            messages.first().map(|message| &message.kind),
            Some(MessageKind::MissingCollection { weekday: Weekday::Tue, .. })
        ));
    }

    #[test]
    fn fortnightly_rule_fires_on_rotation() {
        let location = home(vec![fortnightly_friday()]);

        let messages = decide(&location, &[], date(2026, 1, 15));

        assert_eq!(
            messages.first().map(|message| message.body.as_str()),
            Some("Home: Expected Recycling collection tomorrow (Friday) but none scheduled.")
        );
    }

    #[test]
    fn fortnightly_rule_is_silent_off_rotation() {
        let location = home(vec![fortnightly_friday()]);
        assert!(decide(&location, &[], date(2026, 1, 8)).is_empty());
    }

    #[test]
    fn rotation_without_reference_never_fires() {
        let mut rule = fortnightly_friday();
        rule.reference_date = None;
        let location = home(vec![rule]);

        assert!(decide(&location, &[], date(2026, 1, 15)).is_empty());
    }

    #[test]
    fn every_matching_rule_warns_in_configured_order() {
        let location = home(vec![
            weekly(Weekday::Tue, &["General Waste", "Food"]),
            weekly(Weekday::Wed, &["Glass"]),
            weekly(Weekday::Tue, &["Recycling"]),
        ]);

        let bodies: Vec<String> = decide(&location, &[], monday())
            .into_iter()
            .map(|message| message.body)
            .collect();

        assert_eq!(
            bodies,
            vec![
                "Home: Expected General Waste, Food collection tomorrow (Tuesday) but none scheduled.",
                "Home: Expected Recycling collection tomorrow (Tuesday) but none scheduled.",
            ]
        );
    }

    #[test]
    fn summary_and_warnings_are_mutually_exclusive() {
        let location = home(vec![
            weekly(Weekday::Tue, &["General Waste"]),
            weekly(Weekday::Wed, &["Recycling"]),
        ]);
        let start = date(2024, 1, 1);

        for offset in 0..28 {
            let today = start + chrono::Days::new(offset);
            let tomorrow = today + chrono::Days::new(1);
            for events in [vec![], vec![CollectionEvent::new("Garden", tomorrow)]] {
                let messages = decide(&location, &events, today);
                let summaries = messages
                    .iter()
                    .filter(|message| matches!(message.kind, MessageKind::Collections { .. }))
                    .count();
                let warnings = messages.len() - summaries;
                assert!(summaries <= 1, "at most one summary on {today}");
                assert!(
                    summaries == 0 || warnings == 0,
                    "summary and warning together on {today}"
                );
            }
        }
    }

    #[test]
    fn weekday_comes_from_tomorrow_not_today() {
        // Sunday 2024-01-21 -> tomorrow is Monday.
        let location = home(vec![
            weekly(Weekday::Sun, &["Garden"]),
            weekly(Weekday::Mon, &["Glass"]),
        ]);

        let messages = decide(&location, &[], date(2024, 1, 21));

        assert_eq!(messages.len(), 1);
        assert!(matches!(
            messages.first().map(|message| &message.kind),
            Some(MessageKind::MissingCollection { weekday: Weekday::Mon, .. })
        ));
    }

    #[test]
    fn last_representable_day_yields_nothing() {
        let location = home(vec![weekly(Weekday::Tue, &["General Waste"])]);
        assert!(decide(&location, &[], NaiveDate::MAX).is_empty());
    }
}
