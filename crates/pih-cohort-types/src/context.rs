//! Evaluation context

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The (start date, end date, location) triple a cohort is evaluated against
///
/// Immutable for the duration of one evaluation: every node of a composition
/// tree sees the same instance. Hashable so it can key memoized results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
}

impl EvaluationContext {
    /// Create a context for a reporting period, without a location
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            location: None,
        }
    }

    /// Restrict location-aware predicates to a location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether `start_date <= end_date`
    pub fn is_valid(&self) -> bool {
        self.start_date <= self.end_date
    }
}

/// Which location a location-aware predicate filters on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocationScope {
    /// No location filter
    Any,
    /// The location of the evaluation context; a context without one means any
    #[default]
    FromContext,
    /// A fixed location regardless of context
    Fixed(String),
}

impl LocationScope {
    /// Resolve the filter for a context; `None` accepts every location
    pub fn resolve<'a>(&'a self, ctx: &'a EvaluationContext) -> Option<&'a str> {
        match self {
            Self::Any => None,
            Self::FromContext => ctx.location.as_deref(),
            Self::Fixed(location) => Some(location),
        }
    }
}
