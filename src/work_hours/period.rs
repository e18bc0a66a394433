use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDateError {
    #[error("reference date could not be parsed: {0:?}")]
    Unparseable(String),
    #[error("moving from {0} leaves the supported calendar range")]
    OutOfRange(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown granularity {0:?}, expected one of: day, week, month")]
pub struct UnknownGranularity(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            _ => Err(UnknownGranularity(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    // local midnight of start up to the last millisecond of end
    pub fn bounds(&self, tz: &Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), InvalidDateError> {
        let day_after_end = self
            .end
            .succ_opt()
            .ok_or(InvalidDateError::OutOfRange(self.end))?;

        let start = start_of_day(tz, self.start);
        let end = start_of_day(tz, day_after_end) - Duration::milliseconds(1);
        Ok((start, end))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub granularity: Granularity,
    pub reference: NaiveDate,
}

impl Period {
    pub fn new(granularity: Granularity, reference: NaiveDate) -> Self {
        Self {
            granularity,
            reference,
        }
    }

    pub fn range(&self) -> Result<DateRange, InvalidDateError> {
        compute_range(self.granularity, self.reference)
    }
}

pub fn compute_range(
    granularity: Granularity,
    reference: NaiveDate,
) -> Result<DateRange, InvalidDateError> {
    let out_of_range = || InvalidDateError::OutOfRange(reference);

    match granularity {
        Granularity::Day => Ok(DateRange {
            start: reference,
            end: reference,
        }),
        Granularity::Week => {
            // weeks always start on sunday, whatever the locale says
            let start = reference
                .checked_sub_days(Days::new(
                    reference.weekday().num_days_from_sunday() as u64,
                ))
                .ok_or_else(out_of_range)?;
            let end = start
                .checked_add_days(Days::new(6))
                .ok_or_else(out_of_range)?;
            Ok(DateRange { start, end })
        }
        Granularity::Month => {
            let start = reference.with_day(1).ok_or_else(out_of_range)?;
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|first_of_next| first_of_next.pred_opt())
                .ok_or_else(out_of_range)?;
            Ok(DateRange { start, end })
        }
    }
}

pub fn advance(
    reference: NaiveDate,
    granularity: Granularity,
    direction: Direction,
) -> Result<NaiveDate, InvalidDateError> {
    let moved = match (granularity, direction) {
        (Granularity::Day, Direction::Forward) => reference.checked_add_days(Days::new(1)),
        (Granularity::Day, Direction::Backward) => reference.checked_sub_days(Days::new(1)),
        (Granularity::Week, Direction::Forward) => reference.checked_add_days(Days::new(7)),
        (Granularity::Week, Direction::Backward) => reference.checked_sub_days(Days::new(7)),
        // clamps to the last day of the target month, Jan 31 -> Feb 28
        (Granularity::Month, Direction::Forward) => reference.checked_add_months(Months::new(1)),
        (Granularity::Month, Direction::Backward) => {
            reference.checked_sub_months(Months::new(1))
        }
    };

    moved.ok_or(InvalidDateError::OutOfRange(reference))
}

pub fn parse_reference_date(input: &str, tz: &Tz) -> Result<NaiveDate, InvalidDateError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Ok(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(tz).date_naive());
    }

    Err(InvalidDateError::Unparseable(input.to_string()))
}

fn start_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    // when midnight falls in a DST gap the day starts at the end of the gap
    (0..=24 * 60)
        .find_map(|minutes| {
            let local = midnight.checked_add_signed(Duration::minutes(minutes))?;
            tz.from_local_datetime(&local).earliest()
        })
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use chrono_tz::{America::Sao_Paulo, Europe::Paris};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_day_range_is_the_reference_date() {
        let reference = date(2025, 3, 14);
        let range = compute_range(Granularity::Day, reference).unwrap();

        assert_eq!(range.start, reference);
        assert_eq!(range.end, reference);
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_week_range_starts_on_sunday_at_or_before_reference() {
        let mut reference = date(2024, 12, 25);
        while reference < date(2025, 1, 20) {
            let range = compute_range(Granularity::Week, reference).unwrap();

            assert_eq!(range.start.weekday(), Weekday::Sun);
            assert!(range.start <= reference);
            assert!(range.end >= reference);
            assert_eq!(range.num_days(), 7);

            reference = reference.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_range_when_reference_is_sunday_or_saturday() {
        let sunday = compute_range(Granularity::Week, date(2025, 1, 5)).unwrap();
        assert_eq!(sunday.start, date(2025, 1, 5));
        assert_eq!(sunday.end, date(2025, 1, 11));

        let saturday = compute_range(Granularity::Week, date(2025, 1, 11)).unwrap();
        assert_eq!(saturday.start, date(2025, 1, 5));
        assert_eq!(saturday.end, date(2025, 1, 11));
    }

    #[test]
    fn test_week_range_crossing_year_boundary() {
        let range = compute_range(Granularity::Week, date(2025, 1, 1)).unwrap();
        assert_eq!(range.start, date(2024, 12, 29));
        assert_eq!(range.end, date(2025, 1, 4));
    }

    #[test]
    fn test_month_range_covers_whole_month() {
        let cases = [
            (date(2025, 1, 17), date(2025, 1, 31)),
            (date(2025, 4, 1), date(2025, 4, 30)),
            (date(2025, 2, 10), date(2025, 2, 28)),
            (date(2024, 2, 29), date(2024, 2, 29)),
            (date(2000, 2, 3), date(2000, 2, 29)),
            (date(1900, 2, 3), date(1900, 2, 28)),
            (date(2024, 12, 31), date(2024, 12, 31)),
        ];

        for (reference, expected_end) in cases {
            let range = compute_range(Granularity::Month, reference).unwrap();
            assert_eq!(range.start, date(reference.year(), reference.month(), 1));
            assert_eq!(range.end, expected_end, "month of {reference}");
        }
    }

    #[test]
    fn test_advance_day_and_week() {
        let reference = date(2025, 2, 28);

        assert_eq!(
            advance(reference, Granularity::Day, Direction::Forward).unwrap(),
            date(2025, 3, 1)
        );
        assert_eq!(
            advance(reference, Granularity::Day, Direction::Backward).unwrap(),
            date(2025, 2, 27)
        );
        assert_eq!(
            advance(reference, Granularity::Week, Direction::Forward).unwrap(),
            date(2025, 3, 7)
        );
        assert_eq!(
            advance(reference, Granularity::Week, Direction::Backward).unwrap(),
            date(2025, 2, 21)
        );
    }

    #[test]
    fn test_advance_month_clamps_to_last_day_of_target_month() {
        assert_eq!(
            advance(date(2025, 1, 31), Granularity::Month, Direction::Forward).unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            advance(date(2024, 1, 31), Granularity::Month, Direction::Forward).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            advance(date(2025, 3, 31), Granularity::Month, Direction::Backward).unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            advance(date(2025, 12, 15), Granularity::Month, Direction::Forward).unwrap(),
            date(2026, 1, 15)
        );
    }

    #[test]
    fn test_advance_past_calendar_limit_is_an_error() {
        assert_eq!(
            advance(NaiveDate::MAX, Granularity::Day, Direction::Forward),
            Err(InvalidDateError::OutOfRange(NaiveDate::MAX))
        );
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!(" Week ".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("MONTH".parse::<Granularity>().unwrap(), Granularity::Month);
        assert_eq!(
            "year".parse::<Granularity>(),
            Err(UnknownGranularity("year".to_string()))
        );
    }

    #[test]
    fn test_parse_reference_date_formats() {
        assert_eq!(
            parse_reference_date("2025-01-05", &Paris).unwrap(),
            date(2025, 1, 5)
        );
        assert_eq!(
            parse_reference_date("05/01/2025", &Paris).unwrap(),
            date(2025, 1, 5)
        );
        // 23:30 UTC is already the next day in Paris
        assert_eq!(
            parse_reference_date("2025-01-05T23:30:00Z", &Paris).unwrap(),
            date(2025, 1, 6)
        );
    }

    #[test]
    fn test_parse_reference_date_rejects_garbage() {
        for input in ["", "yesterday", "2025-02-30", "31/02/2025", "2025-13-01"] {
            assert_eq!(
                parse_reference_date(input, &Paris),
                Err(InvalidDateError::Unparseable(input.to_string()))
            );
        }
    }

    #[test]
    fn test_day_bounds_in_time_zone() {
        let range = compute_range(Granularity::Day, date(2025, 1, 5)).unwrap();
        let (start, end) = range.bounds(&Paris).unwrap();

        assert_eq!(start, Paris.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap().to_utc());
        assert_eq!(
            end,
            Paris.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap().to_utc()
                - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_bounds_across_dst_change() {
        // clocks go forward on 2025-03-30 in Paris, that day lasts 23 hours
        let range = compute_range(Granularity::Day, date(2025, 3, 30)).unwrap();
        let (start, end) = range.bounds(&Paris).unwrap();

        assert_eq!(end - start, Duration::hours(23) - Duration::milliseconds(1));
    }

    #[test]
    fn test_bounds_when_midnight_does_not_exist() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04
        let range = compute_range(Granularity::Day, date(2018, 11, 4)).unwrap();
        let (start, _) = range.bounds(&Sao_Paulo).unwrap();

        assert_eq!(
            start,
            Sao_Paulo.with_ymd_and_hms(2018, 11, 4, 1, 0, 0).unwrap().to_utc()
        );
    }
}
