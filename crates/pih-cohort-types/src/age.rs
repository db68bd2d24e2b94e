//! Age units and age ranges

use pih_cohort_diagnostics::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit an age is counted in; ages are always completed whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl fmt::Display for AgeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeUnit::Days => write!(f, "days"),
            AgeUnit::Weeks => write!(f, "weeks"),
            AgeUnit::Months => write!(f, "months"),
            AgeUnit::Years => write!(f, "years"),
        }
    }
}

impl AgeUnit {
    /// The finer of two units when one converts exactly into the other
    ///
    /// Months/years and days/weeks convert exactly; the other pairings yield
    /// `None`.
    pub fn common_with(self, other: AgeUnit) -> Option<AgeUnit> {
        use AgeUnit::{Days, Months, Weeks, Years};
        match (self, other) {
            (x, y) if x == y => Some(x),
            (Years, Months) | (Months, Years) => Some(Months),
            (Weeks, Days) | (Days, Weeks) => Some(Days),
            _ => None,
        }
    }
}

/// An age bound such as "2 years"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Age {
    pub value: u32,
    pub unit: AgeUnit,
}

impl Age {
    pub const fn new(value: u32, unit: AgeUnit) -> Self {
        Self { value, unit }
    }

    pub const fn days(value: u32) -> Self {
        Self::new(value, AgeUnit::Days)
    }

    pub const fn months(value: u32) -> Self {
        Self::new(value, AgeUnit::Months)
    }

    pub const fn years(value: u32) -> Self {
        Self::new(value, AgeUnit::Years)
    }

    /// The bound counted in `unit`, when the conversion is exact
    pub fn in_unit(&self, unit: AgeUnit) -> Option<u64> {
        use AgeUnit::{Days, Months, Weeks, Years};
        let value = u64::from(self.value);
        match (self.unit, unit) {
            (x, y) if x == y => Some(value),
            (Years, Months) => Some(value * 12),
            (Weeks, Days) => Some(value * 7),
            _ => None,
        }
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Inclusive age range; a missing bound is unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: Option<Age>,
    pub max: Option<Age>,
}

impl AgeRange {
    /// Build a range, rejecting bounds that can never both hold
    pub fn new(min: Option<Age>, max: Option<Age>) -> ConfigResult<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            let common = lo.unit.common_with(hi.unit);
            if let Some((lo_v, hi_v)) = common.and_then(|u| Some((lo.in_unit(u)?, hi.in_unit(u)?))) {
                if lo_v > hi_v {
                    return Err(ConfigError::invalid_age_range(format!(
                        "minimum {lo} exceeds maximum {hi}"
                    )));
                }
            }
        }
        Ok(Self { min, max })
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// The unit both bounds are compared in
    ///
    /// The unit of the single bound when only one is set, the finer unit when
    /// both convert exactly, `None` when unbounded or when the units do not
    /// convert.
    pub fn common_unit(&self) -> Option<AgeUnit> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => lo.unit.common_with(hi.unit),
            (Some(bound), None) | (None, Some(bound)) => Some(bound.unit),
            (None, None) => None,
        }
    }
}
