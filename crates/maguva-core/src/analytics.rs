//! # Analytics Maths
//!
//! Time windows, growth percentages and calendar bucketing for the
//! dashboard and the daily report. The aggregation SQL lives in maguva-db;
//! this module decides *which* instants and buckets those queries use.
//!
//! ## Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │        previous window              current window                      │
//! │   [now − 2N ────────────── now − N) [now − N ─────────────── now]       │
//! │                                                                         │
//! │   growth = (current − previous) / previous × 100, rounded to 2 dp       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calendar questions ("this month", "the report day") are answered in the
//! shop's regional offset (UTC+05:30 by default), never in UTC.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::validate_days;

/// Default dashboard look-back.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Default regional offset in minutes (India Standard Time).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Rounds to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage growth from `previous` to `current`.
///
/// ## Rules
/// - `previous == 0`, `current > 0` → 100
/// - `previous == 0`, `current == 0` → 0
/// - otherwise `(current − previous) / previous × 100`, 2 dp
///
/// ## Example
/// ```rust
/// use maguva_core::analytics::growth;
///
/// assert_eq!(growth(0.0, 0.0), 0.0);
/// assert_eq!(growth(0.0, 50.0), 100.0);
/// assert_eq!(growth(100.0, 150.0), 50.0);
/// ```
pub fn growth(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

/// Gross margin percentage, 0 when there is no revenue.
pub fn gross_margin_percent(gross_profit: Money, net_revenue: Money) -> f64 {
    if net_revenue.is_zero() {
        return 0.0;
    }
    round2(gross_profit.as_rupees_f64() / net_revenue.as_rupees_f64() * 100.0)
}

// =============================================================================
// Windows
// =============================================================================

/// The current and previous look-back windows of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsWindow {
    pub days: i64,
    /// Inclusive start of the current window.
    pub start: DateTime<Utc>,
    /// Inclusive end of the current window (now).
    pub end: DateTime<Utc>,
    /// Inclusive start of the previous window; it ends at `start` (exclusive).
    pub previous_start: DateTime<Utc>,
}

impl AnalyticsWindow {
    /// Builds the windows ending at `now`.
    pub fn from_days(days: i64, now: DateTime<Utc>) -> CoreResult<Self> {
        validate_days(days)?;
        let span = Duration::days(days);
        Ok(AnalyticsWindow {
            days,
            start: now - span,
            end: now,
            previous_start: now - span - span,
        })
    }
}

// =============================================================================
// Calendar Helpers
// =============================================================================

/// Builds the regional offset from minutes east of UTC, falling back to UTC
/// for out-of-range values.
pub fn regional_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// Today's date in the regional offset.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// UTC bounds `[start, end)` of a regional calendar day.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use maguva_core::analytics::{day_bounds, regional_offset};
///
/// let (start, end) = day_bounds(
///     NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
///     regional_offset(330),
/// );
/// assert_eq!(start.to_rfc3339(), "2025-03-08T18:30:00+00:00");
/// assert_eq!(end.to_rfc3339(), "2025-03-09T18:30:00+00:00");
/// ```
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, offset);
    (start, start + Duration::days(1))
}

/// UTC instant of the first moment of the regional month containing `now`.
pub fn month_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_date(now, offset);
    let first = today.with_day(1).unwrap_or(today);
    local_midnight(first, offset)
}

/// Sortable month key (`2025-03`) of an instant, in the regional offset.
pub fn month_key(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m").to_string()
}

/// Display label (`Mar 2025`) of an instant, in the regional offset.
pub fn month_label(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%b %Y").to_string()
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    // a fixed offset has no gaps, so local midnight always exists
    let naive = date.and_time(NaiveTime::MIN);
    (naive - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        regional_offset(DEFAULT_UTC_OFFSET_MINUTES)
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_growth() {
        assert_eq!(growth(0.0, 0.0), 0.0);
        assert_eq!(growth(0.0, 50.0), 100.0);
        assert_eq!(growth(100.0, 150.0), 50.0);
        assert_eq!(growth(200.0, 100.0), -50.0);
        assert_eq!(growth(3.0, 4.0), 33.33);
    }

    #[test]
    fn test_window_bounds() {
        let now = utc("2025-03-31T12:00:00Z");
        let window = AnalyticsWindow::from_days(30, now).unwrap();
        assert_eq!(window.start, utc("2025-03-01T12:00:00Z"));
        assert_eq!(window.previous_start, utc("2025-01-30T12:00:00Z"));
        assert_eq!(window.end, now);

        assert!(AnalyticsWindow::from_days(0, now).is_err());
        assert!(AnalyticsWindow::from_days(3651, now).is_err());
    }

    #[test]
    fn test_month_start_uses_regional_calendar() {
        // 20:00 UTC on 31 Mar is already 1 Apr in India
        let now = utc("2025-03-31T20:00:00Z");
        assert_eq!(month_start(now, ist()), utc("2025-03-31T18:30:00Z"));
        assert_eq!(month_label(now, ist()), "Apr 2025");
        assert_eq!(month_key(now, ist()), "2025-04");
        assert_eq!(local_date(now, ist()), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_gross_margin() {
        assert_eq!(gross_margin_percent(Money::zero(), Money::zero()), 0.0);
        assert_eq!(
            gross_margin_percent(Money::from_paise(2_500), Money::from_paise(10_000)),
            25.0
        );
    }
}
