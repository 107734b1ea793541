//! Duration derivation.
//!
//! The elapsed interval is decomposed into whole days, remaining whole hours
//! and remaining whole minutes (seconds are ignored), then expressed as a
//! fractional, unrounded value:
//!
//! | Unit    | Value |
//! |---------|-------|
//! | `HOURS` | `days * 24 + hours + minutes / 60` |
//! | `DAYS`  | `days + hours / 24` |
//! | `WEEKS` | `(days + hours / 24) / 7` |

use chrono::{DateTime, Utc};

use crate::DurationUnit;

/// Computes the duration between `start` and `end` in `unit`.
///
/// Returns `None` when any input is missing or when `end` precedes `start`.
pub fn compute(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    unit: Option<DurationUnit>,
) -> Option<f64> {
    let (start, end, unit) = (start?, end?, unit?);
    if end < start {
        return None;
    }

    let elapsed = end - start;
    let days = elapsed.num_days();
    let hours = (elapsed - chrono::Duration::days(days)).num_hours();
    let minutes =
        (elapsed - chrono::Duration::days(days) - chrono::Duration::hours(hours)).num_minutes();

    let (days, hours, minutes) = (days as f64, hours as f64, minutes as f64);
    let value = match unit {
        DurationUnit::Hours => days * 24.0 + hours + minutes / 60.0,
        DurationUnit::Days => days + hours / 24.0,
        DurationUnit::Weeks => (days + hours / 24.0) / 7.0,
    };
    Some(value)
}
