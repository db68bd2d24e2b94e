//! Leaf predicates
//!
//! Each variant is evaluated by one operator of the engine against a batch of
//! provider data for the whole population.

use crate::temporal::months_before;
use chrono::NaiveDate;
use pih_cohort_model::DateRange;
use pih_cohort_types::{AgeRange, DurationLiteral, EvaluationContext, KeyList, LocationScope, StateRef};
use serde::{Deserialize, Serialize};

/// Date of the context a state predicate is checked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateAnchor {
    StartDate,
    EndDate,
    /// `n` calendar months before the end date
    MonthsBeforeEndDate(u32),
}

impl DateAnchor {
    /// `None` when the date falls outside the representable range
    pub fn resolve(&self, ctx: &EvaluationContext) -> Option<NaiveDate> {
        match self {
            Self::StartDate => Some(ctx.start_date),
            Self::EndDate => Some(ctx.end_date),
            Self::MonthsBeforeEndDate(n) => months_before(ctx.end_date, *n),
        }
    }
}

/// Date window an encounter or observation must fall in
///
/// Windows compare the date component of a record's datetime, so "by end
/// date" includes the whole of the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// Strictly before the start date
    BeforeStartDate,
    /// `[start date, end date]`
    DuringPeriod,
    /// On or before the end date
    ByEndDate,
    /// `[end date - n months, end date]`
    WithinMonthsByEndDate(u32),
}

impl TimeWindow {
    /// The window as an inclusive date range
    pub fn range(&self, ctx: &EvaluationContext) -> Option<DateRange> {
        match self {
            Self::BeforeStartDate => ctx.start_date.pred_opt().map(DateRange::until),
            Self::DuringPeriod => Some(DateRange::new(Some(ctx.start_date), Some(ctx.end_date))),
            Self::ByEndDate => Some(DateRange::until(ctx.end_date)),
            Self::WithinMonthsByEndDate(n) => months_before(ctx.end_date, *n)
                .map(|start| DateRange::new(Some(start), Some(ctx.end_date))),
        }
    }

    pub fn contains(&self, date: NaiveDate, ctx: &EvaluationContext) -> bool {
        self.range(ctx).is_some_and(|range| range.contains(date))
    }
}

/// A leaf predicate over provider data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// A span of any of the states is active on the anchor date
    InState {
        states: Vec<StateRef>,
        location: LocationScope,
        on: DateAnchor,
    },
    /// A span of any of the states started on or before the end date
    EverInState {
        states: Vec<StateRef>,
        location: LocationScope,
    },
    /// A span of any of the states started within the period
    StartedInStateDuringPeriod {
        states: Vec<StateRef>,
        location: LocationScope,
    },
    /// A span of the state started by the end date while the patient was in an age range
    StartedInStateAtAge {
        state: StateRef,
        location: LocationScope,
        ages: AgeRange,
    },
    HasIdentifier {
        types: KeyList,
        location: LocationScope,
    },
    AnyEncounter {
        types: KeyList,
        window: TimeWindow,
    },
    /// An observation of the concept answered with one of the values
    CodedObs {
        concept: String,
        values: KeyList,
        window: TimeWindow,
    },
    /// Any observation of the concept; empty `encounter_types` means any encounter
    AnyObs {
        concept: String,
        encounter_types: KeyList,
        window: TimeWindow,
    },
    /// The latest observation by the end date is at least `threshold` old
    ///
    /// Patients without such an observation are excluded.
    MostRecentObsOlderThan {
        concept: String,
        encounter_types: KeyList,
        threshold: DurationLiteral,
        location: LocationScope,
    },
}

impl Predicate {
    /// Short name used in logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::InState { .. } => "in-state",
            Self::EverInState { .. } => "ever-in-state",
            Self::StartedInStateDuringPeriod { .. } => "started-in-state",
            Self::StartedInStateAtAge { .. } => "started-in-state-at-age",
            Self::HasIdentifier { .. } => "has-identifier",
            Self::AnyEncounter { .. } => "any-encounter",
            Self::CodedObs { .. } => "coded-obs",
            Self::AnyObs { .. } => "any-obs",
            Self::MostRecentObsOlderThan { .. } => "most-recent-obs-older-than",
        }
    }
}
