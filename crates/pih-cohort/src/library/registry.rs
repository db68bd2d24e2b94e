//! Cohort definition registry
//!
//! Maps documented keys such as `pihmalawi.cohortDefinition.hiv.hasAnHccNumber`
//! to shared definitions. Keys iterate in registration order.

use indexmap::IndexMap;
use pih_cohort_diagnostics::{ConfigError, ConfigResult};
use pih_cohort_eval::CohortRef;

/// Key prefix of the HIV cohort library
pub const HIV_PREFIX: &str = "pihmalawi.cohortDefinition.hiv.";

/// Registry of named cohort definitions under one key prefix
#[derive(Debug, Clone)]
pub struct CohortRegistry {
    prefix: String,
    definitions: IndexMap<String, CohortRef>,
}

impl CohortRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            definitions: IndexMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a definition under `prefix + name`
    pub fn register(&mut self, name: &str, definition: CohortRef) -> ConfigResult<()> {
        let key = self.full_key(name);
        if self.definitions.contains_key(&key) {
            return Err(ConfigError::duplicate_key(key));
        }
        self.definitions.insert(key, definition);
        Ok(())
    }

    /// Look up a definition by full key or by name without the prefix
    pub fn get(&self, key: &str) -> ConfigResult<&CohortRef> {
        self.definitions
            .get(key)
            .or_else(|| self.definitions.get(&self.full_key(key)))
            .ok_or_else(|| ConfigError::unknown_cohort(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Full keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CohortRef)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn full_key(&self, name: &str) -> String {
        if name.starts_with(&self.prefix) {
            name.to_string()
        } else {
            format!("{}{name}", self.prefix)
        }
    }
}
