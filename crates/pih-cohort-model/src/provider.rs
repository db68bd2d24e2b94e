//! Data provider traits for cohort evaluation
//!
//! Every provider call is batched across the whole population: one call returns
//! the records of all patients, keyed by patient. Providers are implemented by
//! the surrounding medical-record platform.

use async_trait::async_trait;
use chrono::NaiveDate;
use pih_cohort_types::{Encounter, Identifier, Observation, PatientId, PatientSet, StateSpan};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Records grouped by patient
pub type PatientIndex<T> = HashMap<PatientId, Vec<T>>;

/// Inclusive date range for provider-side filtering; a missing side is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| start <= date) && self.end.is_none_or(|end| date <= end)
    }
}

/// Filters for an observation fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationQuery {
    pub concept: String,
    /// Restrict to observations recorded in these encounter types; empty means any
    pub encounter_types: Vec<String>,
    pub location: Option<String>,
    pub range: Option<DateRange>,
}

impl ObservationQuery {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            encounter_types: Vec::new(),
            location: None,
            range: None,
        }
    }

    pub fn with_encounter_types(mut self, types: impl IntoIterator<Item = String>) -> Self {
        self.encounter_types = types.into_iter().collect();
        self
    }

    pub fn at_location(mut self, location: Option<&str>) -> Self {
        self.location = location.map(str::to_string);
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Whether an observation passes every filter of the query
    pub fn matches(&self, obs: &Observation) -> bool {
        obs.concept == self.concept
            && (self.encounter_types.is_empty()
                || obs
                    .encounter_type
                    .as_ref()
                    .is_some_and(|t| self.encounter_types.contains(t)))
            && self
                .location
                .as_ref()
                .is_none_or(|loc| obs.location.as_ref() == Some(loc))
            && self.range.is_none_or(|range| range.contains(obs.date()))
    }
}

/// Program workflow state history
#[async_trait]
pub trait StateHistoryProvider: Send + Sync {
    /// All spans of a workflow, per patient, ordered by start date
    async fn state_history(&self, workflow: &str) -> Result<PatientIndex<StateSpan>, ProviderError>;
}

/// Encounters
#[async_trait]
pub trait EncounterProvider: Send + Sync {
    /// Encounters of any of the given types, optionally within a date range
    async fn encounters(
        &self,
        types: &[String],
        range: Option<DateRange>,
    ) -> Result<PatientIndex<Encounter>, ProviderError>;
}

/// Observations
#[async_trait]
pub trait ObservationProvider: Send + Sync {
    async fn observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<PatientIndex<Observation>, ProviderError>;
}

/// Patient identifiers
#[async_trait]
pub trait IdentifierProvider: Send + Sync {
    /// Identifiers of any of the given types, optionally only those issued at a location
    async fn identifiers(
        &self,
        types: &[String],
        location: Option<&str>,
    ) -> Result<PatientIndex<Identifier>, ProviderError>;
}

/// Demographics
#[async_trait]
pub trait DemographicsProvider: Send + Sync {
    /// Birth date of a patient, `None` when unknown
    async fn birth_date(&self, patient: PatientId) -> Result<Option<NaiveDate>, ProviderError>;

    /// Birth dates for a set of patients; patients with unknown birth dates are absent
    async fn birth_dates(
        &self,
        patients: &PatientSet,
    ) -> Result<HashMap<PatientId, NaiveDate>, ProviderError> {
        let mut dates = HashMap::with_capacity(patients.len());
        for &patient in patients {
            if let Some(date) = self.birth_date(patient).await? {
                dates.insert(patient, date);
            }
        }
        Ok(dates)
    }
}

/// Data provider error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Retrieve failed: {0}")]
    RetrieveFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use pih_cohort_types::ObsValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weight(encounter_type: Option<&str>, at: NaiveDateTime) -> Observation {
        Observation {
            patient_id: 1,
            concept: "Weight (kg)".to_string(),
            encounter_type: encounter_type.map(str::to_string),
            location: Some("Neno".to_string()),
            value: ObsValue::Numeric(55.into()),
            datetime: at,
        }
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(Some(date(2020, 1, 1)), Some(date(2020, 1, 31)));
        assert!(range.contains(date(2020, 1, 1)));
        assert!(range.contains(date(2020, 1, 31)));
        assert!(!range.contains(date(2020, 2, 1)));
        assert!(DateRange::default().contains(date(1900, 1, 1)));
    }

    #[test]
    fn test_observation_query_filters() {
        let at = date(2020, 1, 10).and_hms_opt(9, 30, 0).unwrap();
        let query = ObservationQuery::new("Weight (kg)")
            .with_encounter_types(["ART_FOLLOWUP".to_string()])
            .within(DateRange::until(date(2020, 1, 10)));

        assert!(query.matches(&weight(Some("ART_FOLLOWUP"), at)));
        assert!(!query.matches(&weight(Some("PART_FOLLOWUP"), at)));
        assert!(!query.matches(&weight(None, at)));

        let any_type = ObservationQuery::new("Weight (kg)").at_location(Some("Neno"));
        assert!(any_type.matches(&weight(None, at)));
        assert!(!ObservationQuery::new("Weight (kg)")
            .at_location(Some("Lisungwi"))
            .matches(&weight(None, at)));
    }
}
