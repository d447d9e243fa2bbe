//! Calendar configuration, month windows, and clock access for billing math.
//!
//! All billing calculations run on calendar days. Instants are converted to a
//! day exactly once, through an explicit [`CalendarConfig`], so nothing in the
//! engine depends on ambient locale or time zone state.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, Offset, Utc,
};
use serde::{Deserialize, Serialize};

/// Working calendar of the engine: a fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl CalendarConfig {
    pub fn utc() -> Self {
        Self::default()
    }

    pub fn with_offset_minutes(minutes: i32) -> Self {
        Self {
            utc_offset_minutes: minutes,
        }
    }

    /// Offset used for day normalization. Out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Normalizes an instant to the calendar day it falls on.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset()).date_naive()
    }

    /// Converts a wall-clock time in this calendar to a UTC instant.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shift = Duration::seconds(self.offset().local_minus_utc() as i64);
        DateTime::from_naive_utc_and_offset(local - shift, Utc)
    }
}

/// Clock abstracts access to the current timestamp so callers stay deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current day in the given calendar.
    fn today(&self, calendar: &CalendarConfig) -> NaiveDate {
        calendar.day_of(self.now())
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Inclusive range of days used to decide whether an occurrence counts toward a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// Window of the month containing `reference`.
    ///
    /// In full-month mode the window starts on the first of the month,
    /// otherwise it starts on `reference` itself. It always ends on the last
    /// day of the month.
    pub fn for_reference(reference: NaiveDate, full_month: bool) -> Self {
        let first = start_of_month(reference);
        Self {
            start: if full_month { first } else { reference },
            end: end_of_month(reference),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn first_of_month(&self) -> NaiveDate {
        start_of_month(self.start)
    }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Months between the month of `from` and the month of `to`, ignoring days.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_idx = from.year() as i64 * 12 + from.month0() as i64;
    let to_idx = to.year() as i64 * 12 + to.month0() as i64;
    to_idx - from_idx
}

/// Shifts `date` by a signed number of months.
///
/// The day of month is clamped to the last day of the target month, so the
/// 31st maps to the 30th, 29th or 28th where needed. Callers stepping through
/// a series always shift from the original anchor, never from a clamped result.
pub fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_window_partial_and_full() {
        let reference = date(2025, 2, 10);
        let partial = MonthWindow::for_reference(reference, false);
        assert_eq!(partial.start, reference);
        assert_eq!(partial.end, date(2025, 2, 28));

        let full = MonthWindow::for_reference(reference, true);
        assert_eq!(full.start, date(2025, 2, 1));
        assert!(full.contains(date(2025, 2, 1)));
        assert!(full.contains(date(2025, 2, 28)));
        assert!(!full.contains(date(2025, 3, 1)));
    }

    #[test]
    fn end_of_month_handles_leap_years_and_december() {
        assert_eq!(end_of_month(date(2024, 2, 3)), date(2024, 2, 29));
        assert_eq!(end_of_month(date(2025, 12, 31)), date(2025, 12, 31));
    }

    #[test]
    fn shift_months_clamps_to_month_end() {
        let anchor = date(2025, 1, 31);
        assert_eq!(shift_months(anchor, 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_months(anchor, 3), Some(date(2025, 4, 30)));
        assert_eq!(shift_months(anchor, 4), Some(date(2025, 5, 31)));
        assert_eq!(shift_months(anchor, -2), Some(date(2024, 11, 30)));
    }

    #[test]
    fn months_between_ignores_days() {
        assert_eq!(months_between(date(2024, 11, 30), date(2025, 2, 1)), 3);
        assert_eq!(months_between(date(2025, 2, 1), date(2024, 11, 30)), -3);
    }

    #[test]
    fn offset_moves_day_boundary() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        assert_eq!(CalendarConfig::utc().day_of(instant), date(2025, 3, 31));
        let berlin = CalendarConfig::with_offset_minutes(120);
        assert_eq!(berlin.day_of(instant), date(2025, 4, 1));
        let local = date(2025, 4, 1).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            berlin.to_utc(local),
            Utc.with_ymd_and_hms(2025, 4, 1, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn invalid_offset_falls_back_to_utc() {
        let calendar = CalendarConfig::with_offset_minutes(60 * 48);
        assert_eq!(calendar.offset().local_minus_utc(), 0);
    }
}
