//! Predicate constructors
//!
//! Builders for the leaf cohorts and the algebra nodes. Arguments are
//! validated here, so a definition that builds is one that can be evaluated.

use crate::definition::{CohortDefinition, CohortRef, Composition};
use crate::predicate::{DateAnchor, Predicate, TimeWindow};
use pih_cohort_diagnostics::{ConfigError, ConfigResult};
use pih_cohort_types::{Age, AgeRange, DurationLiteral, KeyList, LocationScope, StateRef};

fn non_empty_states(states: Vec<StateRef>) -> ConfigResult<Vec<StateRef>> {
    if states.is_empty() {
        return Err(ConfigError::empty_criteria("state list"));
    }
    Ok(states)
}

fn non_empty_keys<S: Into<String>>(
    what: &str,
    keys: impl IntoIterator<Item = S>,
) -> ConfigResult<KeyList> {
    let keys: KeyList = keys.into_iter().map(Into::into).collect();
    if keys.is_empty() {
        return Err(ConfigError::empty_criteria(what));
    }
    Ok(keys)
}

fn names(states: &[StateRef]) -> String {
    states
        .iter()
        .map(|s| s.state.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn anchor_text(on: DateAnchor) -> String {
    match on {
        DateAnchor::StartDate => "start date".to_string(),
        DateAnchor::EndDate => "end date".to_string(),
        DateAnchor::MonthsBeforeEndDate(n) => format!("{n} months before end date"),
    }
}

// ============================================================================
// State history
// ============================================================================

/// Active in the state, at the location, on a context date
pub fn active_in_state_at_location_on_date(
    state: StateRef,
    location: LocationScope,
    on: DateAnchor,
) -> ConfigResult<CohortRef> {
    let description = format!("In {} at location on {}", state.state, anchor_text(on));
    Ok(CohortDefinition::predicate(
        description,
        Predicate::InState {
            states: vec![state],
            location,
            on,
        },
    ))
}

pub fn active_in_state_at_location_on_end_date(
    state: StateRef,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    active_in_state_at_location_on_date(state, location, DateAnchor::EndDate)
}

/// Active in the state `months` months before the end date
///
/// Used with AND NOT against the same state on the end date to express
/// "entered within the last months".
pub fn active_in_state_at_location_num_months_before_end_date(
    state: StateRef,
    location: LocationScope,
    months: u32,
) -> ConfigResult<CohortRef> {
    active_in_state_at_location_on_date(state, location, DateAnchor::MonthsBeforeEndDate(months))
}

/// Active in any of the states on the end date
pub fn active_in_multiple_states_at_location_on_end_date(
    states: Vec<StateRef>,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    let states = non_empty_states(states)?;
    Ok(CohortDefinition::predicate(
        format!("In {} at location on end date", names(&states)),
        Predicate::InState {
            states,
            location,
            on: DateAnchor::EndDate,
        },
    ))
}

/// Entered the state at the location on or before the end date
pub fn ever_enrolled_in_state_at_location_by_end_date(
    state: StateRef,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    ever_enrolled_in_states_by_end_date(vec![state], location)
}

/// Entered any of the states on or before the end date
pub fn ever_enrolled_in_states_by_end_date(
    states: Vec<StateRef>,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    let states = non_empty_states(states)?;
    Ok(CohortDefinition::predicate(
        format!("Ever in {} by end date", names(&states)),
        Predicate::EverInState { states, location },
    ))
}

pub fn started_in_state_at_location_during_period(
    state: StateRef,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    started_in_states_during_period(vec![state], location)
}

/// Entered any of the states within `[start date, end date]`
pub fn started_in_states_during_period(
    states: Vec<StateRef>,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    let states = non_empty_states(states)?;
    Ok(CohortDefinition::predicate(
        format!("Started {} during period", names(&states)),
        Predicate::StartedInStateDuringPeriod { states, location },
    ))
}

/// Active in the state on the end date, at any location
pub fn currently_in_state_on_end_date(state: StateRef) -> ConfigResult<CohortRef> {
    active_in_state_at_location_on_end_date(state, LocationScope::Any)
}

/// Entered the state on or before the end date, at any location
pub fn ever_in_state_by_end_date(state: StateRef) -> ConfigResult<CohortRef> {
    ever_enrolled_in_state_at_location_by_end_date(state, LocationScope::Any)
}

/// Entered the state by the end date while aged within `[min, max]`
///
/// Either bound may be open. Mixed units are compared in the finer of the two.
pub fn started_state_when_in_age_range_at_location_by_end_date(
    state: StateRef,
    location: LocationScope,
    min: Option<Age>,
    max: Option<Age>,
) -> ConfigResult<CohortRef> {
    let ages = AgeRange::new(min, max)?;
    let bound = |age: Option<Age>| age.map_or_else(|| "any".to_string(), |a| a.to_string());
    Ok(CohortDefinition::predicate(
        format!(
            "Aged {} to {} when starting {}",
            bound(min),
            bound(max),
            state.state
        ),
        Predicate::StartedInStateAtAge {
            state,
            location,
            ages,
        },
    ))
}

// ============================================================================
// Identifiers and encounters
// ============================================================================

/// Patients with an identifier of any of the types
pub fn patients_with_identifier_of_type<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    let types = non_empty_keys("identifier type list", types)?;
    Ok(CohortDefinition::predicate(
        format!("Has identifier of type {}", types.join(" or ")),
        Predicate::HasIdentifier { types, location },
    ))
}

fn any_encounter<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
    window: TimeWindow,
    when: &str,
) -> ConfigResult<CohortRef> {
    let types = non_empty_keys("encounter type list", types)?;
    Ok(CohortDefinition::predicate(
        format!("Had {} encounter {when}", types.join(" or ")),
        Predicate::AnyEncounter { types, window },
    ))
}

pub fn any_encounter_of_types_before_start_date<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
) -> ConfigResult<CohortRef> {
    any_encounter(types, TimeWindow::BeforeStartDate, "before start date")
}

pub fn any_encounter_of_types_during_period<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
) -> ConfigResult<CohortRef> {
    any_encounter(types, TimeWindow::DuringPeriod, "during period")
}

pub fn any_encounter_of_types_by_end_date<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
) -> ConfigResult<CohortRef> {
    any_encounter(types, TimeWindow::ByEndDate, "by end date")
}

pub fn any_encounter_of_types_within_months_by_end_date<S: Into<String>>(
    types: impl IntoIterator<Item = S>,
    months: u32,
) -> ConfigResult<CohortRef> {
    any_encounter(
        types,
        TimeWindow::WithinMonthsByEndDate(months),
        &format!("within {months} months of end date"),
    )
}

// ============================================================================
// Observations
// ============================================================================

/// An observation of the concept answered with one of the values, by the end date
pub fn patients_with_coded_obs_by_end_date<S: Into<String>>(
    concept: impl Into<String>,
    values: impl IntoIterator<Item = S>,
) -> ConfigResult<CohortRef> {
    let concept = concept.into();
    let values = non_empty_keys("coded value list", values)?;
    Ok(CohortDefinition::predicate(
        format!("{concept} is {} by end date", values.join(" or ")),
        Predicate::CodedObs {
            concept,
            values,
            window: TimeWindow::ByEndDate,
        },
    ))
}

/// Any observation of the concept during the period; no encounter types means any
pub fn patients_with_any_obs_during_period<S: Into<String>>(
    concept: impl Into<String>,
    encounter_types: impl IntoIterator<Item = S>,
) -> ConfigResult<CohortRef> {
    let concept = concept.into();
    Ok(CohortDefinition::predicate(
        format!("Has {concept} during period"),
        Predicate::AnyObs {
            concept,
            encounter_types: encounter_types.into_iter().map(Into::into).collect(),
            window: TimeWindow::DuringPeriod,
        },
    ))
}

pub fn patients_with_any_obs_within_months_by_end_date(
    concept: impl Into<String>,
    months: u32,
) -> ConfigResult<CohortRef> {
    let concept = concept.into();
    Ok(CohortDefinition::predicate(
        format!("Has {concept} within {months} months of end date"),
        Predicate::AnyObs {
            concept,
            encounter_types: KeyList::new(),
            window: TimeWindow::WithinMonthsByEndDate(months),
        },
    ))
}

/// Latest observation by the end date is at least `threshold` old
///
/// `threshold` is a duration literal such as `"3w"` or `"2m"`, parsed here.
pub fn patients_whose_most_recent_obs_date_is_older_than_value_at_location_by_end_date<
    S: Into<String>,
>(
    concept: impl Into<String>,
    encounter_types: impl IntoIterator<Item = S>,
    threshold: &str,
    location: LocationScope,
) -> ConfigResult<CohortRef> {
    let threshold: DurationLiteral = threshold.parse()?;
    let concept = concept.into();
    let encounter_types = non_empty_keys("encounter type list", encounter_types)?;
    Ok(CohortDefinition::predicate(
        format!("Most recent {concept} is {threshold} or older by end date"),
        Predicate::MostRecentObsOlderThan {
            concept,
            encounter_types,
            threshold,
            location,
        },
    ))
}

// ============================================================================
// Algebra
// ============================================================================

/// Patients in every operand
pub fn patients_in_all(operands: Vec<CohortRef>) -> ConfigResult<CohortRef> {
    let description = operands
        .iter()
        .map(|c| c.description())
        .collect::<Vec<_>>()
        .join(" AND ");
    CohortDefinition::all(description, operands)
}

/// Patients in any operand
pub fn patients_in_any(operands: Vec<CohortRef>) -> ConfigResult<CohortRef> {
    let description = operands
        .iter()
        .map(|c| c.description())
        .collect::<Vec<_>>()
        .join(" OR ");
    CohortDefinition::any(description, operands)
}

/// Ordered composition chain, folded left to right
pub fn patient_composition(chain: Composition) -> ConfigResult<CohortRef> {
    let mut description = chain.first().description().to_string();
    for (op, operand) in chain.steps() {
        description.push_str(&format!(" {op} {}", operand.description()));
    }
    Ok(CohortDefinition::composition(description, chain))
}
