//! State history operators

use crate::error::EvalResult;
use crate::predicate::DateAnchor;
use crate::session::EvaluationSession;
use crate::temporal::age_in_range;
use pih_cohort_types::{AgeRange, EvaluationContext, PatientSet, StateRef, StateSpan};

impl EvaluationSession {
    /// Patients with a span of any of the states, at the location, accepted by `keep`
    ///
    /// One history fetch per distinct workflow among the states.
    async fn patients_with_span(
        &self,
        states: &[StateRef],
        location: Option<&str>,
        keep: impl Fn(&StateSpan) -> bool,
    ) -> EvalResult<PatientSet> {
        let mut workflows: Vec<&str> = states.iter().map(|s| s.workflow.as_str()).collect();
        workflows.sort_unstable();
        workflows.dedup();

        let mut patients = PatientSet::new();
        for workflow in workflows {
            let history = self.state_history(workflow).await?;
            patients.extend(
                self.members(&history)
                    .filter(|(_, spans)| {
                        spans.iter().any(|span| {
                            states.iter().any(|state| span.is_state(state))
                                && span.is_at(location)
                                && keep(span)
                        })
                    })
                    .map(|(pid, _)| pid),
            );
        }
        Ok(patients)
    }

    /// Active in any of the states on the anchor date
    pub(crate) async fn eval_in_state(
        &self,
        states: &[StateRef],
        location: Option<&str>,
        on: DateAnchor,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let Some(date) = on.resolve(ctx) else {
            return Ok(PatientSet::new());
        };
        self.patients_with_span(states, location, |span| span.is_active_on(date))
            .await
    }

    /// Entered any of the states on or before the end date
    pub(crate) async fn eval_ever_in_state(
        &self,
        states: &[StateRef],
        location: Option<&str>,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let end = ctx.end_date;
        self.patients_with_span(states, location, |span| span.start_date <= end)
            .await
    }

    pub(crate) async fn eval_started_during_period(
        &self,
        states: &[StateRef],
        location: Option<&str>,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let (start, end) = (ctx.start_date, ctx.end_date);
        self.patients_with_span(states, location, |span| {
            start <= span.start_date && span.start_date <= end
        })
        .await
    }

    /// Entered the state by the end date while inside the age range
    ///
    /// Age is taken at the span's start date. Patients with an unknown birth
    /// date are excluded.
    pub(crate) async fn eval_started_at_age(
        &self,
        state: &StateRef,
        location: Option<&str>,
        ages: &AgeRange,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let births = self.birth_dates().await?;
        let end = ctx.end_date;
        self.patients_with_span(std::slice::from_ref(state), location, |span| {
            span.start_date <= end
                && births
                    .get(&span.patient_id)
                    .is_some_and(|birth| age_in_range(*birth, span.start_date, ages))
        })
        .await
    }
}
