//! Observation operators

use crate::error::EvalResult;
use crate::predicate::TimeWindow;
use crate::session::EvaluationSession;
use pih_cohort_model::ObservationQuery;
use pih_cohort_types::{DurationLiteral, EvaluationContext, PatientSet};

impl EvaluationSession {
    /// An observation of the concept, answered with one of the values, inside the window
    pub(crate) async fn eval_coded_obs(
        &self,
        concept: &str,
        values: &[String],
        window: TimeWindow,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let Some(range) = window.range(ctx) else {
            return Ok(PatientSet::new());
        };
        let index = self.observations(&ObservationQuery::new(concept)).await?;
        Ok(self
            .members(&index)
            .filter(|(_, observations)| {
                observations.iter().any(|obs| {
                    range.contains(obs.date())
                        && obs
                            .value
                            .as_coded()
                            .is_some_and(|answer| values.iter().any(|v| v == answer))
                })
            })
            .map(|(pid, _)| pid)
            .collect())
    }

    /// Any observation of the concept inside the window
    pub(crate) async fn eval_any_obs(
        &self,
        concept: &str,
        encounter_types: &[String],
        window: TimeWindow,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let Some(range) = window.range(ctx) else {
            return Ok(PatientSet::new());
        };
        let query = ObservationQuery::new(concept).with_encounter_types(encounter_types.iter().cloned());
        let index = self.observations(&query).await?;
        Ok(self
            .members(&index)
            .filter(|(_, observations)| observations.iter().any(|obs| range.contains(obs.date())))
            .map(|(pid, _)| pid)
            .collect())
    }

    /// Latest observation by the end date is dated on or before `end date - threshold`
    ///
    /// A patient with no observation by the end date is excluded, not treated
    /// as overdue.
    pub(crate) async fn eval_most_recent_obs_older_than(
        &self,
        concept: &str,
        encounter_types: &[String],
        threshold: DurationLiteral,
        location: Option<&str>,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let end = ctx.end_date;
        let Some(cutoff) = threshold.before(end) else {
            return Ok(PatientSet::new());
        };
        let query = ObservationQuery::new(concept)
            .with_encounter_types(encounter_types.iter().cloned())
            .at_location(location);
        let index = self.observations(&query).await?;
        Ok(self
            .members(&index)
            .filter_map(|(pid, observations)| {
                let latest = observations
                    .iter()
                    .map(|obs| obs.date())
                    .filter(|date| *date <= end)
                    .max()?;
                (latest <= cutoff).then_some(pid)
            })
            .collect())
    }
}
