//! Leaf predicate operators
//!
//! Each submodule adds the evaluation of one family of predicates to
//! [`EvaluationSession`]:
//! - State history (active on a date, ever in state, started during period, started at age)
//! - Identifiers
//! - Encounters
//! - Observations (coded value, presence, most recent older than a threshold)

pub mod encounter;
pub mod identifier;
pub mod observation;
pub mod state;

use crate::error::EvalResult;
use crate::predicate::Predicate;
use crate::session::EvaluationSession;
use pih_cohort_types::{EvaluationContext, PatientSet};

impl EvaluationSession {
    /// Dispatch a leaf predicate to its operator
    pub(crate) async fn eval_predicate(
        &self,
        predicate: &Predicate,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        self.checkpoint()?;
        match predicate {
            Predicate::InState {
                states,
                location,
                on,
            } => self.eval_in_state(states, location.resolve(ctx), *on, ctx).await,
            Predicate::EverInState { states, location } => {
                self.eval_ever_in_state(states, location.resolve(ctx), ctx).await
            }
            Predicate::StartedInStateDuringPeriod { states, location } => {
                self.eval_started_during_period(states, location.resolve(ctx), ctx)
                    .await
            }
            Predicate::StartedInStateAtAge {
                state,
                location,
                ages,
            } => {
                self.eval_started_at_age(state, location.resolve(ctx), ages, ctx)
                    .await
            }
            Predicate::HasIdentifier { types, location } => {
                self.eval_has_identifier(types, location.resolve(ctx)).await
            }
            Predicate::AnyEncounter { types, window } => {
                self.eval_any_encounter(types, *window, ctx).await
            }
            Predicate::CodedObs {
                concept,
                values,
                window,
            } => self.eval_coded_obs(concept, values, *window, ctx).await,
            Predicate::AnyObs {
                concept,
                encounter_types,
                window,
            } => self.eval_any_obs(concept, encounter_types, *window, ctx).await,
            Predicate::MostRecentObsOlderThan {
                concept,
                encounter_types,
                threshold,
                location,
            } => {
                self.eval_most_recent_obs_older_than(
                    concept,
                    encounter_types,
                    *threshold,
                    location.resolve(ctx),
                    ctx,
                )
                .await
            }
        }
    }
}
