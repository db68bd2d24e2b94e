//! Mock providers
//!
//! `CountingStore` wraps a store and counts every provider call, the failing
//! and stalled providers stand in for a broken or hung record store.

use async_trait::async_trait;
use chrono::NaiveDate;
use pih_cohort_model::{
    DataSources, DateRange, DemographicsProvider, EncounterProvider, IdentifierProvider,
    InMemoryStore, ObservationProvider, ObservationQuery, PatientIndex, ProviderError,
    StateHistoryProvider,
};
use pih_cohort_types::{Encounter, Identifier, Observation, PatientId, StateSpan};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper that counts provider calls
pub struct CountingStore {
    inner: InMemoryStore,
    pub state_calls: AtomicUsize,
    pub encounter_calls: AtomicUsize,
    pub observation_calls: AtomicUsize,
    pub identifier_calls: AtomicUsize,
    pub birth_date_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            state_calls: AtomicUsize::new(0),
            encounter_calls: AtomicUsize::new(0),
            observation_calls: AtomicUsize::new(0),
            identifier_calls: AtomicUsize::new(0),
            birth_date_calls: AtomicUsize::new(0),
        }
    }

    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }

    pub fn encounter_calls(&self) -> usize {
        self.encounter_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateHistoryProvider for CountingStore {
    async fn state_history(&self, workflow: &str) -> Result<PatientIndex<StateSpan>, ProviderError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.state_history(workflow).await
    }
}

#[async_trait]
impl EncounterProvider for CountingStore {
    async fn encounters(
        &self,
        types: &[String],
        range: Option<DateRange>,
    ) -> Result<PatientIndex<Encounter>, ProviderError> {
        self.encounter_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encounters(types, range).await
    }
}

#[async_trait]
impl ObservationProvider for CountingStore {
    async fn observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<PatientIndex<Observation>, ProviderError> {
        self.observation_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.observations(query).await
    }
}

#[async_trait]
impl IdentifierProvider for CountingStore {
    async fn identifiers(
        &self,
        types: &[String],
        location: Option<&str>,
    ) -> Result<PatientIndex<Identifier>, ProviderError> {
        self.identifier_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.identifiers(types, location).await
    }
}

#[async_trait]
impl DemographicsProvider for CountingStore {
    async fn birth_date(&self, patient: PatientId) -> Result<Option<NaiveDate>, ProviderError> {
        self.birth_date_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.birth_date(patient).await
    }
}

/// State history provider whose store is down
pub struct FailingStateHistory;

#[async_trait]
impl StateHistoryProvider for FailingStateHistory {
    async fn state_history(&self, _workflow: &str) -> Result<PatientIndex<StateSpan>, ProviderError> {
        Err(ProviderError::Unavailable("connection refused".to_string()))
    }
}

/// State history provider that never answers
pub struct StalledStateHistory;

#[async_trait]
impl StateHistoryProvider for StalledStateHistory {
    async fn state_history(&self, _workflow: &str) -> Result<PatientIndex<StateSpan>, ProviderError> {
        futures::future::pending().await
    }
}

/// Sources backed by `store`, with the state history replaced
pub fn with_states(store: Arc<InMemoryStore>, states: Arc<dyn StateHistoryProvider>) -> DataSources {
    DataSources::new(states, store.clone(), store.clone(), store.clone(), store)
}
