//! Evaluation session
//!
//! A session covers one report run over one population. It memoizes every
//! `(definition, context)` result and every provider fetch, so a sub-cohort
//! shared by several parents is evaluated once and each workflow, encounter
//! type list, observation query and identifier query is fetched once for the
//! whole population.

use crate::algebra::{compose, intersect_all, union_any};
use crate::definition::{CohortKind, CohortRef, DefinitionId};
use crate::engine::EngineOptions;
use crate::error::{EvalError, EvalResult};
use crate::resolver::StateTransitionResolver;
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use parking_lot::Mutex;
use pih_cohort_model::{DataSources, ObservationQuery, PatientIndex};
use pih_cohort_types::{
    Encounter, EvaluationContext, Identifier, KeyList, Observation, Outcome, PatientId, PatientSet,
    StateRef, StateSpan,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Cooperative cancellation signal, checked on entry to every node and fetch
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Values computed at most once per key, concurrent callers share the computation
struct OnceMap<K, V> {
    label: &'static str,
    cells: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> OnceMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn new(label: &'static str) -> Self {
        Self {
            label,
            cells: Mutex::new(HashMap::new()),
        }
    }

    async fn get_or_try_init<F, Fut>(&self, key: &K, init: F) -> EvalResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EvalResult<V>>,
    {
        let cell = {
            let mut cells = self.cells.lock();
            cells.entry(key.clone()).or_default().clone()
        };
        if let Some(value) = cell.get() {
            log::trace!("{} hit for {:?}", self.label, key);
            return Ok(value.clone());
        }
        // a failed init leaves the cell empty, errors are not cached
        let value = cell
            .get_or_try_init(|| async { init().await.map(Arc::new) })
            .await?;
        Ok(value.clone())
    }

    fn len(&self) -> usize {
        self.cells.lock().values().filter(|cell| cell.initialized()).count()
    }
}

type Memo = OnceMap<(DefinitionId, EvaluationContext), PatientSet>;

/// One report run over one population
pub struct EvaluationSession {
    sources: DataSources,
    options: EngineOptions,
    population: PatientSet,
    cancel: CancellationFlag,
    memo: Memo,
    histories: OnceMap<String, PatientIndex<StateSpan>>,
    encounters: OnceMap<KeyList, PatientIndex<Encounter>>,
    observations: OnceMap<ObservationQuery, PatientIndex<Observation>>,
    identifiers: OnceMap<(KeyList, Option<String>), PatientIndex<Identifier>>,
    birth_dates: OnceCell<Arc<HashMap<PatientId, NaiveDate>>>,
}

impl EvaluationSession {
    pub(crate) fn new(sources: DataSources, options: EngineOptions, population: PatientSet) -> Self {
        Self {
            sources,
            options,
            population,
            cancel: CancellationFlag::new(),
            memo: OnceMap::new("memo"),
            histories: OnceMap::new("state history cache"),
            encounters: OnceMap::new("encounter cache"),
            observations: OnceMap::new("observation cache"),
            identifiers: OnceMap::new("identifier cache"),
            birth_dates: OnceCell::new(),
        }
    }

    /// The population every result is drawn from
    pub fn population(&self) -> &PatientSet {
        &self.population
    }

    /// Handle that cancels this session from another task
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn resolver(&self) -> StateTransitionResolver {
        StateTransitionResolver::new(self.options.anchor_policy)
    }

    /// Number of distinct `(definition, context)` results computed so far
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    /// Evaluate a cohort against a context
    ///
    /// The result is a subset of the session population. Fails on an inverted
    /// context, on cancellation, on timeout, and on any provider failure.
    pub async fn evaluate(
        &self,
        definition: &CohortRef,
        ctx: &EvaluationContext,
    ) -> EvalResult<Arc<PatientSet>> {
        if !ctx.is_valid() {
            return Err(EvalError::invalid_context(format!(
                "start date {} is after end date {}",
                ctx.start_date, ctx.end_date
            )));
        }
        match self.options.timeout_secs {
            Some(seconds) => {
                tokio::time::timeout(Duration::from_secs(seconds), self.eval_node(definition, ctx))
                    .await
                    .unwrap_or_else(|_| Err(EvalError::Timeout { seconds }))
            }
            None => self.eval_node(definition, ctx).await,
        }
    }

    fn eval_node<'a>(
        &'a self,
        definition: &'a CohortRef,
        ctx: &'a EvaluationContext,
    ) -> BoxFuture<'a, EvalResult<Arc<PatientSet>>> {
        async move {
            self.checkpoint()?;
            let key = (definition.id(), ctx.clone());
            self.memo
                .get_or_try_init(&key, || self.compute(definition, ctx))
                .await
        }
        .boxed()
    }

    async fn compute(&self, definition: &CohortRef, ctx: &EvaluationContext) -> EvalResult<PatientSet> {
        if let CohortKind::Predicate(predicate) = definition.kind() {
            let result = self.eval_predicate(predicate, ctx).await?;
            log::debug!(
                "{definition} [{}] -> {} patients",
                predicate.kind_name(),
                result.len()
            );
            return Ok(result);
        }

        let sets = self.eval_operands(definition.children(), ctx).await?;
        let result = match definition.kind() {
            CohortKind::All(_) => intersect_all(sets)?,
            CohortKind::Any(_) => union_any(sets)?,
            CohortKind::Composition(chain) => {
                let mut sets = sets.into_iter();
                let first = sets
                    .next()
                    .ok_or_else(|| EvalError::internal("composition without operands"))?;
                compose(first, chain.steps().iter().map(|(op, _)| *op).zip(sets))
            }
            CohortKind::Predicate(_) => return Err(EvalError::internal("predicate has no operands")),
        };
        log::trace!("{definition} -> {} patients", result.len());
        Ok(result)
    }

    async fn eval_operands<'a>(
        &'a self,
        operands: Vec<&'a CohortRef>,
        ctx: &'a EvaluationContext,
    ) -> EvalResult<Vec<Arc<PatientSet>>> {
        if self.options.concurrent_leaves {
            return try_join_all(operands.into_iter().map(|op| self.eval_node(op, ctx))).await;
        }
        let mut sets = Vec::with_capacity(operands.len());
        for op in operands {
            sets.push(self.eval_node(op, ctx).await?);
        }
        Ok(sets)
    }

    pub(crate) fn checkpoint(&self) -> EvalResult<()> {
        if self.cancel.is_cancelled() {
            Err(EvalError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Entries of an index that belong to the population
    pub(crate) fn members<'a, T>(
        &'a self,
        index: &'a PatientIndex<T>,
    ) -> impl Iterator<Item = (PatientId, &'a [T])> + 'a {
        index
            .iter()
            .filter(|(pid, _)| self.population.contains(*pid))
            .map(|(pid, records)| (*pid, records.as_slice()))
    }

    /// Outcome of every patient in the population that left one of the source states
    pub async fn outcomes(
        &self,
        workflow: &str,
        source_states: &[StateRef],
        location: Option<&str>,
    ) -> EvalResult<BTreeMap<PatientId, Outcome>> {
        let history = self.state_history(workflow).await?;
        let resolver = self.resolver();
        Ok(self
            .members(&history)
            .filter_map(|(pid, spans)| {
                resolver
                    .resolve(spans, source_states, location)
                    .map(|outcome| (pid, outcome))
            })
            .collect())
    }

    /// Spans of a workflow for every patient, fetched once per session
    pub async fn state_history(&self, workflow: &str) -> EvalResult<Arc<PatientIndex<StateSpan>>> {
        self.checkpoint()?;
        self.histories
            .get_or_try_init(&workflow.to_string(), || async {
                log::trace!("fetching state history of '{workflow}'");
                Ok::<_, EvalError>(self.sources.states.state_history(workflow).await?)
            })
            .await
    }

    /// Encounters of the given types at any date, fetched once per type list
    pub async fn encounters(&self, types: &[String]) -> EvalResult<Arc<PatientIndex<Encounter>>> {
        self.checkpoint()?;
        let key: KeyList = types.iter().cloned().collect();
        self.encounters
            .get_or_try_init(&key, || async {
                log::trace!("fetching encounters of types {types:?}");
                Ok::<_, EvalError>(self.sources.encounters.encounters(types, None).await?)
            })
            .await
    }

    pub async fn observations(
        &self,
        query: &ObservationQuery,
    ) -> EvalResult<Arc<PatientIndex<Observation>>> {
        self.checkpoint()?;
        self.observations
            .get_or_try_init(query, || async {
                log::trace!("fetching observations of '{}'", query.concept);
                Ok::<_, EvalError>(self.sources.observations.observations(query).await?)
            })
            .await
    }

    pub async fn identifiers(
        &self,
        types: &[String],
        location: Option<&str>,
    ) -> EvalResult<Arc<PatientIndex<Identifier>>> {
        self.checkpoint()?;
        let key = (types.iter().cloned().collect::<KeyList>(), location.map(str::to_string));
        self.identifiers
            .get_or_try_init(&key, || async {
                log::trace!("fetching identifiers of types {types:?}");
                Ok::<_, EvalError>(self.sources.identifiers.identifiers(types, location).await?)
            })
            .await
    }

    /// Known birth dates of the population, fetched once per session
    pub async fn birth_dates(&self) -> EvalResult<Arc<HashMap<PatientId, NaiveDate>>> {
        self.checkpoint()?;
        let dates = self
            .birth_dates
            .get_or_try_init(|| async {
                log::trace!("fetching birth dates of {} patients", self.population.len());
                let dates = self.sources.demographics.birth_dates(&self.population).await?;
                Ok::<_, EvalError>(Arc::new(dates))
            })
            .await?;
        Ok(dates.clone())
    }
}

impl fmt::Debug for EvaluationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationSession")
            .field("population", &self.population.len())
            .field("memoized", &self.memo.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_once_map_computes_once() {
        let map: OnceMap<u32, String> = OnceMap::new("test");
        let first = map
            .get_or_try_init(&1, || async { Ok::<_, EvalError>("one".to_string()) })
            .await
            .unwrap();
        let second = map
            .get_or_try_init(&1, || async { Err::<String, _>(EvalError::internal("must not run")) })
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(map.len(), 1);
    }

    #[tokio::test]
    async fn test_once_map_does_not_cache_errors() {
        let map: OnceMap<u32, String> = OnceMap::new("test");
        let failed = map
            .get_or_try_init(&1, || async { Err::<String, _>(EvalError::internal("boom")) })
            .await;
        assert!(failed.is_err());
        assert_eq!(map.len(), 0);

        let value = map
            .get_or_try_init(&1, || async { Ok::<_, EvalError>("retry".to_string()) })
            .await
            .unwrap();
        assert_eq!(value.as_str(), "retry");
    }

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());
        handle.cancel();
        assert!(flag.is_cancelled());
    }
}
