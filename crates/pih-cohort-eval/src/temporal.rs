//! Age and relative-date arithmetic
//!
//! Ages are counted in completed whole units. Month arithmetic follows the
//! calendar and clamps to the end of shorter months, so a child born on
//! 31 January has completed one month on the last day of February.

use chrono::{Datelike, Months, NaiveDate};
use pih_cohort_types::{Age, AgeRange, AgeUnit};

/// Completed whole units between `birth` and `on`
///
/// `None` when `on` is before `birth`.
pub fn age_at(birth: NaiveDate, on: NaiveDate, unit: AgeUnit) -> Option<u32> {
    if on < birth {
        return None;
    }
    match unit {
        AgeUnit::Days => u32::try_from((on - birth).num_days()).ok(),
        AgeUnit::Weeks => u32::try_from((on - birth).num_days() / 7).ok(),
        AgeUnit::Months => completed_months(birth, on),
        AgeUnit::Years => completed_months(birth, on).map(|m| m / 12),
    }
}

fn completed_months(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    let span = (on.year() - birth.year()) * 12 + on.month() as i32 - birth.month() as i32;
    let mut months = u32::try_from(span).ok()?;
    // the anniversary in the last candidate month may not have been reached yet
    if months > 0 && birth.checked_add_months(Months::new(months))? > on {
        months -= 1;
    }
    Some(months)
}

/// The date `n` calendar months before `date`
pub fn months_before(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(n))
}

/// Whether the age on a date reaches `bound`, counted in the bound's own unit
pub fn at_least(birth: NaiveDate, on: NaiveDate, bound: Age) -> bool {
    age_at(birth, on, bound.unit).is_some_and(|age| age >= bound.value)
}

/// Whether the age on a date does not exceed `bound`, counted in the bound's own unit
pub fn at_most(birth: NaiveDate, on: NaiveDate, bound: Age) -> bool {
    age_at(birth, on, bound.unit).is_some_and(|age| age <= bound.value)
}

/// Whether the age on a date falls inside an inclusive range
///
/// Both bounds are converted to the range's common unit and compared against
/// the completed age in that unit, so `[6 months, 1 year]` means 6 to 12
/// completed months. Bounds whose units do not convert (days against months)
/// are each checked in their own unit. A missing bound is unbounded and a
/// date before birth is never in range.
pub fn age_in_range(birth: NaiveDate, on: NaiveDate, range: &AgeRange) -> bool {
    if on < birth {
        return false;
    }
    let Some(unit) = range.common_unit() else {
        return range.min.is_none_or(|min| at_least(birth, on, min))
            && range.max.is_none_or(|max| at_most(birth, on, max));
    };
    let Some(age) = age_at(birth, on, unit).map(u64::from) else {
        return false;
    };
    let bound = |b: Option<Age>| b.and_then(|b| b.in_unit(unit));
    bound(range.min).is_none_or(|min| age >= min) && bound(range.max).is_none_or(|max| age <= max)
}
