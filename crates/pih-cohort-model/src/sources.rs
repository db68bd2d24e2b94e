//! Bundle of data providers handed to the engine

use crate::provider::{
    DemographicsProvider, EncounterProvider, IdentifierProvider, ObservationProvider,
    StateHistoryProvider,
};
use std::sync::Arc;

/// The providers a cohort engine reads from
///
/// Built once at startup and passed explicitly to whoever evaluates cohorts.
#[derive(Clone)]
pub struct DataSources {
    pub states: Arc<dyn StateHistoryProvider>,
    pub encounters: Arc<dyn EncounterProvider>,
    pub observations: Arc<dyn ObservationProvider>,
    pub identifiers: Arc<dyn IdentifierProvider>,
    pub demographics: Arc<dyn DemographicsProvider>,
}

impl DataSources {
    pub fn new(
        states: Arc<dyn StateHistoryProvider>,
        encounters: Arc<dyn EncounterProvider>,
        observations: Arc<dyn ObservationProvider>,
        identifiers: Arc<dyn IdentifierProvider>,
        demographics: Arc<dyn DemographicsProvider>,
    ) -> Self {
        Self {
            states,
            encounters,
            observations,
            identifiers,
            demographics,
        }
    }

    /// Use one store that implements every provider
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: StateHistoryProvider
            + EncounterProvider
            + ObservationProvider
            + IdentifierProvider
            + DemographicsProvider
            + 'static,
    {
        Self {
            states: store.clone(),
            encounters: store.clone(),
            observations: store.clone(),
            identifiers: store.clone(),
            demographics: store,
        }
    }
}

impl std::fmt::Debug for DataSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSources").finish_non_exhaustive()
    }
}
