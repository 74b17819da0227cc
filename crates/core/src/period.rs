//! Scoring period boundaries.
//!
//! A period starts at local midnight on either a configured weekday
//! (weekly) or the first of the month (monthly). "Local" is an IANA time
//! zone, so boundaries follow daylight saving changes; they are always
//! returned as UTC instants.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// How often the baseline rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// Starts at 00:00 on the given weekday.
    Weekly(Weekday),
    /// Starts at 00:00 on the 1st of each month.
    Monthly,
}

/// Period boundary rule: the cadence plus the time zone of the boundary
/// clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRule {
    pub kind: PeriodKind,
    pub tz: Tz,
}

impl PeriodRule {
    pub fn new(kind: PeriodKind, tz: Tz) -> Self {
        Self { kind, tz }
    }

    /// Weekly periods on the UTC clock.
    pub fn weekly(starts_on: Weekday) -> Self {
        Self::new(PeriodKind::Weekly(starts_on), Tz::UTC)
    }

    /// Monthly periods on the UTC clock.
    pub fn monthly() -> Self {
        Self::new(PeriodKind::Monthly, Tz::UTC)
    }

    /// The boundary instant of the period containing `now`.
    ///
    /// `now` itself is included: a boundary exactly at `now` returns `now`.
    pub fn period_start(&self, now: Timestamp) -> Timestamp {
        let local_date = now.with_timezone(&self.tz).date_naive();
        let start_date = match self.kind {
            PeriodKind::Weekly(starts_on) => {
                let days_back = (local_date.weekday().num_days_from_monday() + 7
                    - starts_on.num_days_from_monday())
                    % 7;
                local_date - Duration::days(i64::from(days_back))
            }
            PeriodKind::Monthly => local_date.with_day(1).unwrap_or(local_date),
        };
        self.local_midnight(start_date)
    }

    /// The boundary of the period immediately before the one starting at
    /// `boundary`.
    pub fn previous_period_start(&self, boundary: Timestamp) -> Timestamp {
        self.period_start(boundary - Duration::seconds(1))
    }

    /// Start of `date` on the local clock. Where midnight falls in a
    /// daylight saving gap, the first local instant that exists is used.
    fn local_midnight(&self, date: NaiveDate) -> Timestamp {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=2)
            .map(|hours| midnight + Duration::hours(hours))
            .find_map(|local| self.tz.from_local_datetime(&local).earliest())
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

impl fmt::Display for PeriodRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PeriodKind::Weekly(day) => write!(f, "weekly ({day} 00:00 {})", self.tz.name()),
            PeriodKind::Monthly => write!(f, "monthly (1st 00:00 {})", self.tz.name()),
        }
    }
}

/// Whether a rotation is due for `boundary` given the boundary of the last
/// completed rotation.
///
/// Comparing boundary instants (rather than re-checking a time window)
/// makes repeated checks within one period a no-op.
pub fn rotation_due(last_rotated_for: Option<Timestamp>, boundary: Timestamp) -> bool {
    match last_rotated_for {
        Some(last) => last < boundary,
        None => true,
    }
}

/// Parse a period kind from `weekly` / `monthly` plus a weekday name.
pub fn parse_period_kind(kind: &str, week_start: &str) -> Result<PeriodKind, CoreError> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "weekly" => {
            let day: Weekday = week_start.trim().parse().map_err(|_| {
                CoreError::Validation(format!("Invalid weekday '{week_start}'"))
            })?;
            Ok(PeriodKind::Weekly(day))
        }
        "monthly" => Ok(PeriodKind::Monthly),
        other => Err(CoreError::Validation(format!(
            "Invalid period '{other}'. Must be 'weekly' or 'monthly'"
        ))),
    }
}

/// Parse an IANA time zone name such as `America/Los_Angeles` or `UTC`.
pub fn parse_timezone(value: &str) -> Result<Tz, CoreError> {
    let value = value.trim();
    value.parse::<Tz>().map_err(|_| {
        CoreError::Validation(format!(
            "Invalid time zone '{value}'. Must be an IANA name such as 'Europe/London'"
        ))
    })
}
