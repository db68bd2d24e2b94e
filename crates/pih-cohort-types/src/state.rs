//! Program workflow state history

use crate::patient::PatientId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state of a program workflow, e.g. "Pre-ART (Continue)" of "Treatment status"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    pub workflow: String,
    pub state: String,
}

impl StateRef {
    pub fn new(workflow: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            state: state.into(),
        }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workflow, self.state)
    }
}

/// One interval during which a patient held a workflow state
///
/// `end_date == None` means the span is still open. Spans for one patient and
/// workflow are expected to be ordered and non-overlapping, but providers may
/// return anything and the engine uses the history as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateSpan {
    pub patient_id: PatientId,
    pub workflow: String,
    pub state: String,
    /// `None` means the location was not recorded
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl StateSpan {
    pub fn new(
        patient_id: PatientId,
        state: &StateRef,
        location: Option<&str>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            patient_id,
            workflow: state.workflow.clone(),
            state: state.state.clone(),
            location: location.map(str::to_string),
            start_date,
            end_date,
        }
    }

    /// Whether this span is for the given workflow state
    pub fn is_state(&self, state: &StateRef) -> bool {
        self.workflow == state.workflow && self.state == state.state
    }

    /// Whether the span matches a location filter; `None` accepts every span
    pub fn is_at(&self, location: Option<&str>) -> bool {
        match location {
            None => true,
            Some(loc) => self.location.as_deref() == Some(loc),
        }
    }

    /// `start_date <= date <= end_date`, an open span never ends
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end| date <= end)
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn state_ref(&self) -> StateRef {
        StateRef::new(self.workflow.clone(), self.state.clone())
    }
}

/// The state a patient moved into after leaving a tracked state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub patient_id: PatientId,
    pub resulting_state: String,
    pub transition_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_span_is_active_from_start_onwards() {
        let pre_art = StateRef::new("Treatment status", "Pre-ART (Continue)");
        let span = StateSpan::new(1, &pre_art, Some("Neno"), date(2020, 1, 1), None);

        assert!(span.is_active_on(date(2020, 1, 1)));
        assert!(span.is_active_on(date(2020, 12, 31)));
        assert!(!span.is_active_on(date(2019, 12, 31)));
    }

    #[test]
    fn test_closed_span_includes_end_date() {
        let pre_art = StateRef::new("Treatment status", "Pre-ART (Continue)");
        let span = StateSpan::new(1, &pre_art, None, date(2020, 1, 1), Some(date(2020, 6, 1)));

        assert!(span.is_active_on(date(2020, 6, 1)));
        assert!(!span.is_active_on(date(2020, 6, 2)));
    }

    #[test]
    fn test_location_filter() {
        let on_art = StateRef::new("Treatment status", "On antiretrovirals");
        let known = StateSpan::new(1, &on_art, Some("Neno"), date(2020, 1, 1), None);
        let unknown = StateSpan::new(1, &on_art, None, date(2020, 1, 1), None);

        assert!(known.is_at(None));
        assert!(known.is_at(Some("Neno")));
        assert!(!known.is_at(Some("Lisungwi")));
        assert!(unknown.is_at(None));
        assert!(!unknown.is_at(Some("Neno")));
    }
}
