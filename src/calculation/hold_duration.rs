//! Permit hold duration.
//!
//! Hold progress is measured in whole calendar months from the date the
//! learner permit was issued to "today". It is always computed on demand,
//! never stored.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Returns the whole calendar months from `from` to `to`.
///
/// A month is complete on the same day-of-month, or on the last day of a
/// shorter month. Returns zero when `to` is before `from`.
///
/// ```
/// use logbook_engine::calculation::months_between;
/// use chrono::NaiveDate;
///
/// let issued = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// assert_eq!(months_between(issued, NaiveDate::from_ymd_opt(2025, 2, 27).unwrap()), 0);
/// assert_eq!(months_between(issued, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()), 1);
/// assert_eq!(months_between(issued, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()), 12);
/// ```
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }

    let span = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut months = u32::try_from(span).unwrap_or(0);
    while months > 0
        && from
            .checked_add_months(Months::new(months))
            .is_none_or(|anniversary| anniversary > to)
    {
        months -= 1;
    }
    months
}

/// Hold progress for a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldProgress {
    /// Whole months the permit has been held.
    pub elapsed_months: u32,
    /// Months required.
    pub required_months: u32,
    /// Whether the requirement is met.
    pub complete: bool,
    /// The date the requirement was or will be met, if the permit date is known.
    pub eligible_on: Option<NaiveDate>,
}

/// Computes hold progress from the permit date.
///
/// A zero-month requirement is complete even without a permit date.
///
/// # Arguments
///
/// * `permit_received` - When the permit was issued, if recorded
/// * `required_months` - Months required for the learner's age and stage
/// * `today` - The evaluation date
pub fn hold_progress(
    permit_received: Option<NaiveDate>,
    required_months: u32,
    today: NaiveDate,
) -> HoldProgress {
    let elapsed_months = permit_received.map_or(0, |issued| months_between(issued, today));
    let eligible_on =
        permit_received.and_then(|issued| issued.checked_add_months(Months::new(required_months)));

    HoldProgress {
        elapsed_months,
        required_months,
        complete: elapsed_months >= required_months,
        eligible_on,
    }
}
