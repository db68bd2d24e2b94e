//! Encounter operators

use crate::error::EvalResult;
use crate::predicate::TimeWindow;
use crate::session::EvaluationSession;
use pih_cohort_types::{EvaluationContext, PatientSet};

impl EvaluationSession {
    /// Patients with an encounter of the given types inside the window
    pub(crate) async fn eval_any_encounter(
        &self,
        types: &[String],
        window: TimeWindow,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let Some(range) = window.range(ctx) else {
            return Ok(PatientSet::new());
        };
        let index = self.encounters(types).await?;
        Ok(self
            .members(&index)
            .filter(|(_, encounters)| encounters.iter().any(|e| range.contains(e.date())))
            .map(|(pid, _)| pid)
            .collect())
    }
}
