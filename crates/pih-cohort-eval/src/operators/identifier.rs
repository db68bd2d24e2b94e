//! Identifier operators

use crate::error::EvalResult;
use crate::session::EvaluationSession;
use pih_cohort_types::PatientSet;

impl EvaluationSession {
    /// Patients carrying at least one identifier of the given types
    pub(crate) async fn eval_has_identifier(
        &self,
        types: &[String],
        location: Option<&str>,
    ) -> EvalResult<PatientSet> {
        let index = self.identifiers(types, location).await?;
        Ok(self
            .members(&index)
            .filter(|(_, identifiers)| !identifiers.is_empty())
            .map(|(pid, _)| pid)
            .collect())
    }
}
