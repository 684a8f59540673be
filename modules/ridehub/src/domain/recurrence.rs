//! Expansion of a recurring ride template into concrete start times.

use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    #[default]
    None,
    Weekly,
    Biweekly,
    Monthly,
}

impl Cadence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Weekly => "WEEKLY",
            Self::Biweekly => "BIWEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "" | "none" | "once" => Some(Self::None),
            "weekly" => Some(Self::Weekly),
            "biweekly" | "fortnightly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        self != Self::None
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("a recurring ride needs an end date or an occurrence count")]
    MissingBound,
    #[error("recurrence end date {until} is before the first ride on {start}")]
    EndBeforeStart { start: Date, until: Date },
    #[error("occurrence count must be at least 1")]
    ZeroCount,
    #[error("recurrence runs past the supported calendar range")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub starts: Vec<OffsetDateTime>,
    /// More occurrences matched the rule than `max` allowed.
    pub truncated: bool,
}

/// Generate every start time of a series, template first.
///
/// `until` is an inclusive calendar date in the offset of `start`. Monthly
/// steps are computed from the original day of month and clamped to the
/// length of the target month, so Jan 31 yields Feb 28 (or 29) then Mar 31.
pub fn expand(
    start: OffsetDateTime,
    cadence: Cadence,
    until: Option<Date>,
    count: Option<u32>,
    max: u32,
) -> Result<Expansion, RecurrenceError> {
    if !cadence.is_recurring() {
        return Ok(Expansion {
            starts: vec![start],
            truncated: false,
        });
    }
    if until.is_none() && count.is_none() {
        return Err(RecurrenceError::MissingBound);
    }
    if count == Some(0) {
        return Err(RecurrenceError::ZeroCount);
    }
    if let Some(until) = until.filter(|until| *until < start.date()) {
        return Err(RecurrenceError::EndBeforeStart {
            start: start.date(),
            until,
        });
    }

    let max = max.max(1);
    let wanted = count.unwrap_or(u32::MAX);
    let mut starts = Vec::new();
    let mut truncated = false;

    for n in 0..wanted {
        let next = occurrence(start, cadence, n).ok_or(RecurrenceError::OutOfRange)?;
        if until.is_some_and(|until| next.date() > until) {
            break;
        }
        if starts.len() == max as usize {
            truncated = true;
            break;
        }
        starts.push(next);
    }

    Ok(Expansion { starts, truncated })
}

fn occurrence(start: OffsetDateTime, cadence: Cadence, n: u32) -> Option<OffsetDateTime> {
    match cadence {
        Cadence::None => (n == 0).then_some(start),
        Cadence::Weekly => start.checked_add(Duration::weeks(i64::from(n))),
        Cadence::Biweekly => start.checked_add(Duration::weeks(2 * i64::from(n))),
        Cadence::Monthly => add_months(start, n),
    }
}

fn add_months(start: OffsetDateTime, months: u32) -> Option<OffsetDateTime> {
    let date = start.date();
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + i32::try_from(months).ok()?;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;

    let mut day = date.day();
    loop {
        if let Ok(d) = Date::from_calendar_date(year, month, day) {
            return Some(start.replace_date(d));
        }
        if day <= 28 {
            return None;
        }
        day -= 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn single_ride_without_cadence() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let out = expand(start, Cadence::None, None, None, 52).unwrap();
        assert_eq!(out.starts, vec![start]);
        assert!(!out.truncated);
    }

    #[test]
    fn weekly_until_is_inclusive() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let out = expand(start, Cadence::Weekly, Some(date!(2026-03-22)), None, 52).unwrap();
        assert_eq!(
            out.starts,
            vec![
                datetime!(2026-03-01 08:00 UTC),
                datetime!(2026-03-08 08:00 UTC),
                datetime!(2026-03-15 08:00 UTC),
                datetime!(2026-03-22 08:00 UTC),
            ]
        );
    }

    #[test]
    fn biweekly_by_count() {
        let start = datetime!(2026-03-01 18:30 +02:00);
        let out = expand(start, Cadence::Biweekly, None, Some(3), 52).unwrap();
        assert_eq!(
            out.starts,
            vec![
                datetime!(2026-03-01 18:30 +02:00),
                datetime!(2026-03-15 18:30 +02:00),
                datetime!(2026-03-29 18:30 +02:00),
            ]
        );
    }

    #[test]
    fn monthly_clamps_to_month_length_from_original_day() {
        let start = datetime!(2026-01-31 07:00 UTC);
        let out = expand(start, Cadence::Monthly, None, Some(4), 52).unwrap();
        assert_eq!(
            out.starts,
            vec![
                datetime!(2026-01-31 07:00 UTC),
                datetime!(2026-02-28 07:00 UTC),
                datetime!(2026-03-31 07:00 UTC),
                datetime!(2026-04-30 07:00 UTC),
            ]
        );
    }

    #[test]
    fn monthly_handles_leap_year_and_year_rollover() {
        let start = datetime!(2027-12-31 07:00 UTC);
        let out = expand(start, Cadence::Monthly, None, Some(3), 52).unwrap();
        assert_eq!(out.starts[1], datetime!(2028-01-31 07:00 UTC));
        assert_eq!(out.starts[2], datetime!(2028-02-29 07:00 UTC));
    }

    #[test]
    fn count_and_until_stop_at_whichever_comes_first() {
        let start = datetime!(2026-03-01 08:00 UTC);
        let out = expand(start, Cadence::Weekly, Some(date!(2026-12-31)), Some(2), 52).unwrap();
        assert_eq!(out.starts.len(), 2);

        let out = expand(start, Cadence::Weekly, Some(date!(2026-03-10)), Some(10), 52).unwrap();
        assert_eq!(out.starts.len(), 2);
    }

    #[test]
    fn cap_truncates_instead_of_failing() {
        let start = datetime!(2026-01-01 08:00 UTC);
        let out = expand(start, Cadence::Weekly, Some(date!(2030-01-01)), None, 52).unwrap();
        assert_eq!(out.starts.len(), 52);
        assert!(out.truncated);

        let out = expand(start, Cadence::Weekly, None, Some(52), 52).unwrap();
        assert_eq!(out.starts.len(), 52);
        assert!(!out.truncated);
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let start = datetime!(2026-03-10 08:00 UTC);
        assert_eq!(
            expand(start, Cadence::Weekly, None, None, 52),
            Err(RecurrenceError::MissingBound)
        );
        assert_eq!(
            expand(start, Cadence::Weekly, None, Some(0), 52),
            Err(RecurrenceError::ZeroCount)
        );
        assert!(matches!(
            expand(start, Cadence::Monthly, Some(date!(2026-03-09)), None, 52),
            Err(RecurrenceError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn until_on_start_day_yields_template_only() {
        let start = datetime!(2026-03-10 20:00 UTC);
        let out = expand(start, Cadence::Weekly, Some(date!(2026-03-10)), None, 52).unwrap();
        assert_eq!(out.starts, vec![start]);
    }

    #[test]
    fn cadence_parsing() {
        assert_eq!(Cadence::parse("Weekly"), Some(Cadence::Weekly));
        assert_eq!(Cadence::parse("BI-WEEKLY"), Some(Cadence::Biweekly));
        assert_eq!(Cadence::parse("none"), Some(Cadence::None));
        assert_eq!(Cadence::parse("yearly"), None);
    }
}
