//! Duration literals such as "3w", "8 weeks" or "2m"
//!
//! Literals are parsed once, when a cohort definition is built. Only weeks and
//! months are accepted; any other unit is a configuration error rather than a
//! silently defaulted value.

use chrono::{Days, Months, NaiveDate};
use chumsky::prelude::*;
use pih_cohort_diagnostics::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a duration literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Weeks,
    Months,
}

/// A quantity + unit duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DurationLiteral {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl DurationLiteral {
    pub const fn weeks(amount: u32) -> Self {
        Self {
            amount,
            unit: DurationUnit::Weeks,
        }
    }

    pub const fn months(amount: u32) -> Self {
        Self {
            amount,
            unit: DurationUnit::Months,
        }
    }

    /// The date lying this duration before `date`
    ///
    /// Month arithmetic clamps to the last day of the target month
    /// (2020-03-31 minus 1 month is 2020-02-29). Returns `None` only when the
    /// result falls outside the representable date range.
    pub fn before(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.unit {
            DurationUnit::Weeks => date.checked_sub_days(Days::new(u64::from(self.amount) * 7)),
            DurationUnit::Months => date.checked_sub_months(Months::new(self.amount)),
        }
    }
}

impl fmt::Display for DurationLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            DurationUnit::Weeks => write!(f, "{}w", self.amount),
            DurationUnit::Months => write!(f, "{}m", self.amount),
        }
    }
}

impl FromStr for DurationLiteral {
    type Err = ConfigError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let normalized = literal.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ConfigError::malformed_duration(literal, "empty literal"));
        }

        literal_parser()
            .parse(normalized.as_str())
            .into_result()
            .map_err(|errors| {
                let reason = errors
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unrecognised literal".to_string());
                ConfigError::malformed_duration(literal, reason)
            })
    }
}

/// `<digits> [whitespace] <unit>` where unit is w/week/weeks or m/month/months
fn literal_parser<'a>() -> impl Parser<'a, &'a str, DurationLiteral, extra::Err<Rich<'a, char>>> {
    let amount = text::int(10).try_map(|digits: &str, span| {
        digits
            .parse::<u32>()
            .map_err(|e| Rich::custom(span, e.to_string()))
    });

    let unit = choice((
        just("weeks").to(DurationUnit::Weeks),
        just("week").to(DurationUnit::Weeks),
        just("w").to(DurationUnit::Weeks),
        just("months").to(DurationUnit::Months),
        just("month").to(DurationUnit::Months),
        just("m").to(DurationUnit::Months),
    ));

    amount
        .then_ignore(text::inline_whitespace())
        .then(unit)
        .then_ignore(end())
        .map(|(amount, unit)| DurationLiteral { amount, unit })
}
