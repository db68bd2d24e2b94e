//! State-transition resolution over one patient's workflow history
//!
//! Given the spans of one (patient, workflow) pair, the resolver finds the
//! state the patient moved into after their anchor span in a set of tracked
//! source states. The history is used exactly as provided: overlapping or
//! unordered spans are not repaired.

use chrono::NaiveDate;
use pih_cohort_types::{Outcome, StateRef, StateSpan};
use serde::{Deserialize, Serialize};

/// Which matching source span anchors the resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPolicy {
    /// Most recent entry into a tracked state
    #[default]
    Latest,
    /// First entry into a tracked state
    Earliest,
}

/// Resolves outcomes from state-span histories
#[derive(Debug, Clone, Copy, Default)]
pub struct StateTransitionResolver {
    policy: AnchorPolicy,
}

impl StateTransitionResolver {
    pub fn new(policy: AnchorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Index and span of the anchor among the matching source spans
    ///
    /// Equal start dates are broken by list order: the later span for
    /// [`AnchorPolicy::Latest`], the earlier for [`AnchorPolicy::Earliest`].
    pub fn anchor<'a>(
        &self,
        history: &'a [StateSpan],
        source_states: &[StateRef],
        location: Option<&str>,
    ) -> Option<(usize, &'a StateSpan)> {
        let matching = history.iter().enumerate().filter(|(_, span)| {
            source_states.iter().any(|state| span.is_state(state)) && span.is_at(location)
        });
        match self.policy {
            AnchorPolicy::Latest => matching.max_by_key(|(_, span)| span.start_date),
            AnchorPolicy::Earliest => matching.min_by_key(|(_, span)| span.start_date),
        }
    }

    /// The state the patient moved into after the anchor span
    ///
    /// The next span is the one with the smallest start date after the anchor:
    /// on or after the anchor's end date when it has one, otherwise strictly
    /// after its start date. Spans of any state and location qualify. `None`
    /// when no source span matches or nothing follows the anchor.
    pub fn resolve(
        &self,
        history: &[StateSpan],
        source_states: &[StateRef],
        location: Option<&str>,
    ) -> Option<Outcome> {
        let (anchor_idx, anchor) = self.anchor(history, source_states, location)?;

        let follows = |span: &StateSpan| match anchor.end_date {
            Some(end) => span.start_date >= end,
            None => span.start_date > anchor.start_date,
        };

        let next = history
            .iter()
            .enumerate()
            .filter(|(idx, span)| *idx != anchor_idx && follows(span))
            .min_by_key(|(_, span)| span.start_date)
            .map(|(_, span)| span)?;

        Some(Outcome {
            patient_id: anchor.patient_id,
            resulting_state: next.state.clone(),
            transition_date: next.start_date,
        })
    }
}

/// First span of a state, by start date
pub fn first_entry_into<'a>(history: &'a [StateSpan], state: &StateRef) -> Option<&'a StateSpan> {
    history
        .iter()
        .filter(|span| span.is_state(state))
        .min_by_key(|span| span.start_date)
}

/// The span active on a date; the latest start wins when spans overlap
pub fn state_on(history: &[StateSpan], date: NaiveDate) -> Option<&StateSpan> {
    history
        .iter()
        .filter(|span| span.is_active_on(date))
        .max_by_key(|span| span.start_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pre_art() -> StateRef {
        StateRef::new("Treatment status", "Pre-ART (Continue)")
    }

    fn on_art() -> StateRef {
        StateRef::new("Treatment status", "On antiretrovirals")
    }

    fn died() -> StateRef {
        StateRef::new("Treatment status", "Patient died")
    }

    fn span(state: &StateRef, loc: &str, start: NaiveDate, end: Option<NaiveDate>) -> StateSpan {
        StateSpan::new(7, state, Some(loc), start, end)
    }

    fn pre_art_then_art() -> Vec<StateSpan> {
        vec![
            span(&pre_art(), "LocA", date(2020, 1, 1), Some(date(2020, 6, 1))),
            span(&on_art(), "LocA", date(2020, 6, 1), None),
        ]
    }

    #[test]
    fn test_outcome_after_pre_art() {
        let outcome = StateTransitionResolver::default()
            .resolve(&pre_art_then_art(), &[pre_art()], Some("LocA"))
            .unwrap();
        assert_eq!(
            outcome,
            Outcome {
                patient_id: 7,
                resulting_state: "On antiretrovirals".to_string(),
                transition_date: date(2020, 6, 1),
            }
        );
    }

    #[test]
    fn test_no_outcome_when_still_in_state() {
        let resolver = StateTransitionResolver::default();
        assert_eq!(resolver.resolve(&pre_art_then_art(), &[on_art()], Some("LocA")), None);
    }

    #[test]
    fn test_no_outcome_without_matching_span() {
        let resolver = StateTransitionResolver::default();
        assert_eq!(resolver.resolve(&pre_art_then_art(), &[pre_art()], Some("LocB")), None);
        assert_eq!(resolver.resolve(&[], &[pre_art()], None), None);
    }

    #[test]
    fn test_anchor_is_latest_entry() {
        // pre-ART twice; only the second stint's exit counts
        let history = vec![
            span(&pre_art(), "LocA", date(2019, 1, 1), Some(date(2019, 3, 1))),
            span(&on_art(), "LocA", date(2019, 3, 1), Some(date(2019, 9, 1))),
            span(&pre_art(), "LocA", date(2019, 9, 1), Some(date(2020, 2, 1))),
            span(&died(), "LocA", date(2020, 2, 1), None),
        ];

        let latest = StateTransitionResolver::default()
            .resolve(&history, &[pre_art()], Some("LocA"))
            .unwrap();
        assert_eq!(latest.resulting_state, "Patient died");

        let earliest = StateTransitionResolver::new(AnchorPolicy::Earliest)
            .resolve(&history, &[pre_art()], Some("LocA"))
            .unwrap();
        assert_eq!(earliest.resulting_state, "On antiretrovirals");
        assert_eq!(earliest.transition_date, date(2019, 3, 1));
    }

    #[test]
    fn test_exit_date_takes_precedence() {
        // an overlapping span that starts before the anchor's exit is not the outcome
        let history = vec![
            span(&pre_art(), "LocA", date(2020, 1, 1), Some(date(2020, 6, 1))),
            span(&on_art(), "LocB", date(2020, 3, 1), Some(date(2020, 4, 1))),
            span(&died(), "LocA", date(2020, 7, 1), None),
        ];
        let outcome = StateTransitionResolver::default()
            .resolve(&history, &[pre_art()], Some("LocA"))
            .unwrap();
        assert_eq!(outcome.resulting_state, "Patient died");
        assert_eq!(outcome.transition_date, date(2020, 7, 1));
    }

    #[test]
    fn test_open_anchor_uses_start_date() {
        // provider data with an open span followed by a later one is used as given
        let history = vec![
            span(&pre_art(), "LocA", date(2020, 1, 1), None),
            span(&on_art(), "LocA", date(2020, 2, 1), None),
        ];
        let outcome = StateTransitionResolver::default()
            .resolve(&history, &[pre_art()], Some("LocA"))
            .unwrap();
        assert_eq!(outcome.transition_date, date(2020, 2, 1));
    }

    #[test]
    fn test_any_location_accepts_unrecorded() {
        let history = vec![
            StateSpan::new(7, &pre_art(), None, date(2020, 1, 1), Some(date(2020, 2, 1))),
            StateSpan::new(7, &died(), None, date(2020, 2, 1), None),
        ];
        let resolver = StateTransitionResolver::default();
        assert!(resolver.resolve(&history, &[pre_art()], None).is_some());
        assert!(resolver.resolve(&history, &[pre_art()], Some("LocA")).is_none());
    }

    #[test]
    fn test_first_entry_and_state_on() {
        let history = pre_art_then_art();
        assert_eq!(
            first_entry_into(&history, &on_art()).map(|s| s.start_date),
            Some(date(2020, 6, 1))
        );
        assert!(first_entry_into(&history, &died()).is_none());

        // both spans include 2020-06-01; the later start wins
        assert_eq!(
            state_on(&history, date(2020, 6, 1)).map(|s| s.state.as_str()),
            Some("On antiretrovirals")
        );
        assert_eq!(
            state_on(&history, date(2020, 3, 1)).map(|s| s.state.as_str()),
            Some("Pre-ART (Continue)")
        );
        assert!(state_on(&history, date(2019, 1, 1)).is_none());
    }
}
