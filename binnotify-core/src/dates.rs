//! Calendar-date comparison, rotation arithmetic, and weekday names.
//!
//! Every comparison here works on UTC calendar dates. Values carrying a time of
//! day or an offset are first reduced to the UTC date they fall on, so two
//! instants on the same UTC day always compare equal regardless of how they
//! were written down.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::model::ScheduleError;

const DAYS_PER_WEEK: i64 = 7;

/// A value that can be reduced to a UTC calendar date.
pub trait CalendarDate {
    /// The UTC calendar date this value falls on.
    fn utc_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn utc_date(&self) -> NaiveDate {
        *self
    }
}

/// Naive date-times are taken to already be in UTC.
impl CalendarDate for NaiveDateTime {
    fn utc_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn utc_date(&self) -> NaiveDate {
        self.with_timezone(&Utc).date_naive()
    }
}

/// True when both values fall on the same UTC calendar day.
#[must_use]
pub fn dates_match(left: &impl CalendarDate, right: &impl CalendarDate) -> bool {
    let (left, right) = (left.utc_date(), right.utc_date());
    left.year() == right.year() && left.ordinal() == right.ordinal()
}

/// Check whether `target` lies a whole multiple of `every_n_weeks` weeks away
/// from `reference`.
///
/// The distance is measured in absolute days, so a reference after the target
/// works the same as one before it. Only whole weeks count; the remainder
/// within a week is ignored. `every_n_weeks <= 0` never matches and
/// `every_n_weeks == 1` always does.
#[must_use]
pub fn is_on_rotation(
    reference: &impl CalendarDate,
    target: &impl CalendarDate,
    every_n_weeks: i64,
) -> bool {
    if every_n_weeks <= 0 {
        return false;
    }
    if every_n_weeks == 1 {
        return true;
    }

    let days_between = target
        .utc_date()
        .signed_duration_since(reference.utc_date())
        .num_days()
        .abs();

    (days_between / DAYS_PER_WEEK) % every_n_weeks == 0
}

/// Parse one of the seven English weekday names, ignoring case.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidWeekday`] for anything else, including
/// abbreviations, surrounding whitespace, and the empty string.
pub fn parse_weekday(name: &str) -> Result<Weekday, ScheduleError> {
    match name.to_lowercase().as_str() {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        _ => Err(ScheduleError::InvalidWeekday(name.to_owned())),
    }
}

/// Full English name of a weekday, as used in outgoing messages.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveTime};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time"))
    }

    #[test]
    fn same_date_matches() {
        assert!(dates_match(&date(2024, 6, 15), &date(2024, 6, 15)));
    }

    #[test]
    fn same_date_different_times_matches() {
        assert!(dates_match(
            &at(date(2024, 6, 15), 10, 30),
            &at(date(2024, 6, 15), 22, 45)
        ));
    }

    #[test]
    fn different_day_month_or_year_does_not_match() {
        let base = date(2024, 6, 15);
        assert!(!dates_match(&base, &date(2024, 6, 16)));
        assert!(!dates_match(&base, &date(2024, 7, 15)));
        assert!(!dates_match(&base, &date(2025, 6, 15)));
    }

    #[test]
    fn same_ordinal_in_different_years_does_not_match() {
        // 2023-03-01 and 2024-02-29 are both day 60 of their year.
        assert!(!dates_match(&date(2023, 3, 1), &date(2024, 2, 29)));
    }

    #[test]
    fn offsets_are_normalised_to_utc_before_comparing() {
        let plus_two = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        let morning_in_plus_two = plus_two
            .from_local_datetime(&at(date(2024, 6, 15), 10, 0))
            .single()
            .expect("unambiguous local time");
        let evening_utc = Utc.from_utc_datetime(&at(date(2024, 6, 15), 20, 0));

        assert!(dates_match(&morning_in_plus_two, &evening_utc));
        assert!(dates_match(&morning_in_plus_two, &date(2024, 6, 15)));
    }

    #[test]
    fn local_evening_west_of_utc_is_next_utc_day() {
        let minus_five = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let late_evening = minus_five
            .from_local_datetime(&at(date(2024, 1, 15), 23, 30))
            .single()
            .expect("unambiguous local time");

        assert_eq!(late_evening.utc_date(), date(2024, 1, 16), "04:30 UTC next day");
    }

    #[test]
    fn rotation_table() {
        // 2026-01-02 is a Friday.
        let reference = date(2026, 1, 2);
        let cases = [
            ("same day is on", date(2026, 1, 2), 2, true),
            ("1 week later is off for fortnightly", date(2026, 1, 9), 2, false),
            ("2 weeks later is on for fortnightly", date(2026, 1, 16), 2, true),
            ("3 weeks later is off for fortnightly", date(2026, 1, 23), 2, false),
            ("every 3 weeks, week 3 is on", date(2026, 1, 23), 3, true),
            ("every 3 weeks, week 2 is off", date(2026, 1, 16), 3, false),
            ("weekly is always on", date(2026, 1, 9), 1, true),
            ("zero never matches", date(2026, 1, 2), 0, false),
            ("negative never matches", date(2026, 1, 2), -1, false),
        ];

        for (name, target, every_n_weeks, expected) in cases {
            assert_eq!(
                is_on_rotation(&reference, &target, every_n_weeks),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn rotation_with_reference_in_the_future() {
        let reference = date(2026, 1, 16);
        assert!(is_on_rotation(&reference, &date(2026, 1, 2), 2));
        assert!(!is_on_rotation(&reference, &date(2026, 1, 9), 2));
    }

    #[test]
    fn rotation_is_symmetric() {
        let first = date(2026, 1, 2);
        for offset in 0..60 {
            let second = first + chrono::Days::new(offset);
            for every_n_weeks in 1..5 {
                assert_eq!(
                    is_on_rotation(&first, &second, every_n_weeks),
                    is_on_rotation(&second, &first, every_n_weeks),
                    "offset {offset}, every {every_n_weeks} weeks"
                );
            }
        }
    }

    #[test]
    fn zero_offset_is_always_on_rotation() {
        let reference = date(2025, 11, 30);
        for every_n_weeks in 1..10 {
            assert!(is_on_rotation(&reference, &reference, every_n_weeks));
        }
    }

    #[test]
    fn rotation_ignores_days_within_the_week() {
        // 15 days apart is 2 whole weeks plus a day.
        assert!(is_on_rotation(&date(2026, 1, 2), &date(2026, 1, 17), 2));
    }

    #[test]
    fn rotation_normalises_time_of_day() {
        assert!(is_on_rotation(
            &at(date(2026, 1, 2), 18, 30),
            &at(date(2026, 1, 16), 9, 15),
            2
        ));
    }

    #[test]
    fn parses_weekday_names_case_insensitively() {
        let cases = [
            ("monday", Weekday::Mon),
            ("TUESDAY", Weekday::Tue),
            ("Wednesday", Weekday::Wed),
            ("thursday", Weekday::Thu),
            ("friday", Weekday::Fri),
            ("saturday", Weekday::Sat),
            ("sunday", Weekday::Sun),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_weekday(input).ok(), Some(expected), "{input}");
        }
    }

    #[test]
    fn rejects_unknown_weekday_names() {
        for input in ["notaday", "", "mon", "tues", " monday", "friday\n"] {
            assert!(
                matches!(parse_weekday(input), Err(ScheduleError::InvalidWeekday(ref raw)) if raw == input),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn weekday_names_round_trip_through_parse() {
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert_eq!(parse_weekday(weekday_name(weekday)).ok(), Some(weekday));
        }
    }
}
