//! Failing providers

use async_trait::async_trait;
use pih_cohort::DataSources;
use pih_cohort::model::{IdentifierProvider, InMemoryStore, PatientIndex, ProviderError};
use pih_cohort::types::Identifier;
use std::sync::Arc;

/// Identifier provider whose store is down
pub struct FailingIdentifiers;

#[async_trait]
impl IdentifierProvider for FailingIdentifiers {
    async fn identifiers(
        &self,
        _types: &[String],
        _location: Option<&str>,
    ) -> Result<PatientIndex<Identifier>, ProviderError> {
        Err(ProviderError::Unavailable("identifier service down".to_string()))
    }
}

/// Sources backed by `store`, with identifiers failing
pub fn without_identifiers(store: Arc<InMemoryStore>) -> DataSources {
    DataSources::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FailingIdentifiers),
        store,
    )
}
