//! Cohort engine
//!
//! The engine owns the data providers and the engine options. Evaluation
//! happens in an [`EvaluationSession`], one per report run.

use crate::definition::CohortRef;
use crate::error::EvalResult;
use crate::resolver::{AnchorPolicy, StateTransitionResolver};
use crate::session::EvaluationSession;
use pih_cohort_model::DataSources;
use pih_cohort_types::{EvaluationContext, PatientSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Anchor span selection of the state-transition resolver
    pub anchor_policy: AnchorPolicy,
    /// Deadline for one top-level evaluation
    pub timeout_secs: Option<u64>,
    /// Evaluate sibling operands concurrently
    pub concurrent_leaves: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            anchor_policy: AnchorPolicy::Latest,
            timeout_secs: None,
            concurrent_leaves: true,
        }
    }
}

impl EngineOptions {
    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// The cohort evaluation engine
#[derive(Debug, Clone)]
pub struct CohortEngine {
    sources: DataSources,
    options: EngineOptions,
}

impl CohortEngine {
    /// Create an engine with default options
    pub fn new(sources: DataSources) -> Self {
        Self::with_options(sources, EngineOptions::default())
    }

    pub fn with_options(sources: DataSources, options: EngineOptions) -> Self {
        Self { sources, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn sources(&self) -> &DataSources {
        &self.sources
    }

    pub fn resolver(&self) -> StateTransitionResolver {
        StateTransitionResolver::new(self.options.anchor_policy)
    }

    /// Start a report run over a population
    pub fn session(&self, population: PatientSet) -> EvaluationSession {
        log::debug!("starting evaluation session over {} patients", population.len());
        EvaluationSession::new(self.sources.clone(), self.options.clone(), population)
    }

    /// Evaluate one cohort in a fresh session
    pub async fn evaluate(
        &self,
        definition: &CohortRef,
        population: PatientSet,
        ctx: &EvaluationContext,
    ) -> EvalResult<PatientSet> {
        let session = self.session(population);
        let result = session.evaluate(definition, ctx).await?;
        Ok(Arc::unwrap_or_clone(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_defaults() {
        let options = EngineOptions::from_json("{}").unwrap();
        assert_eq!(options, EngineOptions::default());
        assert!(options.concurrent_leaves);
        assert_eq!(options.anchor_policy, AnchorPolicy::Latest);
    }

    #[test]
    fn test_options_from_json() {
        let options = EngineOptions::from_json(
            r#"{"anchor_policy": "earliest", "timeout_secs": 30, "concurrent_leaves": false}"#,
        )
        .unwrap();
        assert_eq!(options.anchor_policy, AnchorPolicy::Earliest);
        assert_eq!(options.timeout_secs, Some(30));
        assert!(!options.concurrent_leaves);

        assert!(EngineOptions::from_json(r#"{"anchor_policy": "middle"}"#).is_err());
    }
}
