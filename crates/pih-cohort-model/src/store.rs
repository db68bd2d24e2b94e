//! In-memory store implementing every provider
//!
//! Used by tests and by small deployments that load a snapshot of the record
//! store up front.

use crate::provider::{
    DateRange, DemographicsProvider, EncounterProvider, IdentifierProvider, ObservationProvider,
    ObservationQuery, PatientIndex, ProviderError, StateHistoryProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use pih_cohort_types::{
    Encounter, Identifier, Observation, Patient, PatientId, PatientSet, StateSpan,
};
use std::collections::HashMap;

#[derive(Default)]
struct StoreData {
    patients: HashMap<PatientId, Patient>,
    spans: Vec<StateSpan>,
    encounters: Vec<Encounter>,
    observations: Vec<Observation>,
    identifiers: Vec<Identifier>,
}

/// Thread-safe in-memory record store
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_patient(&self, patient: Patient) {
        self.data.write().patients.insert(patient.id, patient);
    }

    pub fn add_state_span(&self, span: StateSpan) {
        self.data.write().spans.push(span);
    }

    pub fn add_encounter(&self, encounter: Encounter) {
        self.data.write().encounters.push(encounter);
    }

    pub fn add_observation(&self, observation: Observation) {
        self.data.write().observations.push(observation);
    }

    pub fn add_identifier(&self, identifier: Identifier) {
        self.data.write().identifiers.push(identifier);
    }

    /// Every known patient
    pub fn patients(&self) -> PatientSet {
        self.data.read().patients.keys().copied().collect()
    }
}

fn group<T: Clone>(
    records: &[T],
    patient: impl Fn(&T) -> PatientId,
    keep: impl Fn(&T) -> bool,
) -> PatientIndex<T> {
    let mut index: PatientIndex<T> = HashMap::new();
    for record in records.iter().filter(|r| keep(r)) {
        index.entry(patient(record)).or_default().push(record.clone());
    }
    index
}

#[async_trait]
impl StateHistoryProvider for InMemoryStore {
    async fn state_history(&self, workflow: &str) -> Result<PatientIndex<StateSpan>, ProviderError> {
        let data = self.data.read();
        let mut index = group(&data.spans, |s| s.patient_id, |s| s.workflow == workflow);
        // stable: spans starting on the same day keep insertion order
        for spans in index.values_mut() {
            spans.sort_by_key(|s| s.start_date);
        }
        Ok(index)
    }
}

#[async_trait]
impl EncounterProvider for InMemoryStore {
    async fn encounters(
        &self,
        types: &[String],
        range: Option<DateRange>,
    ) -> Result<PatientIndex<Encounter>, ProviderError> {
        let data = self.data.read();
        let mut index = group(
            &data.encounters,
            |e| e.patient_id,
            |e| {
                types.contains(&e.encounter_type)
                    && range.is_none_or(|range| range.contains(e.date()))
            },
        );
        for encounters in index.values_mut() {
            encounters.sort_by_key(|e| e.datetime);
        }
        Ok(index)
    }
}

#[async_trait]
impl ObservationProvider for InMemoryStore {
    async fn observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<PatientIndex<Observation>, ProviderError> {
        let data = self.data.read();
        let mut index = group(&data.observations, |o| o.patient_id, |o| query.matches(o));
        for observations in index.values_mut() {
            observations.sort_by_key(|o| o.datetime);
        }
        Ok(index)
    }
}

#[async_trait]
impl IdentifierProvider for InMemoryStore {
    async fn identifiers(
        &self,
        types: &[String],
        location: Option<&str>,
    ) -> Result<PatientIndex<Identifier>, ProviderError> {
        let data = self.data.read();
        Ok(group(
            &data.identifiers,
            |i| i.patient_id,
            |i| {
                types.contains(&i.type_key)
                    && location.is_none_or(|loc| i.location.as_deref() == Some(loc))
            },
        ))
    }
}

#[async_trait]
impl DemographicsProvider for InMemoryStore {
    async fn birth_date(&self, patient: PatientId) -> Result<Option<NaiveDate>, ProviderError> {
        Ok(self
            .data
            .read()
            .patients
            .get(&patient)
            .and_then(|p| p.birth_date))
    }
}
