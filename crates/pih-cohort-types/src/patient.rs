//! Patients and patient identifiers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque patient identifier
pub type PatientId = u64;

/// Set of patients, ordered so that results are reproducible
pub type PatientSet = BTreeSet<PatientId>;

/// A patient as seen by the cohort engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    /// Unknown birth dates are common and must not fail evaluation
    pub birth_date: Option<NaiveDate>,
}

impl Patient {
    pub fn new(id: PatientId, birth_date: Option<NaiveDate>) -> Self {
        Self { id, birth_date }
    }
}

/// A patient identifier (HCC number, ARV number, ...)
///
/// A patient may carry several identifiers of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub patient_id: PatientId,
    pub type_key: String,
    pub value: String,
    pub location: Option<String>,
}

impl Identifier {
    pub fn new(
        patient_id: PatientId,
        type_key: impl Into<String>,
        value: impl Into<String>,
        location: Option<&str>,
    ) -> Self {
        Self {
            patient_id,
            type_key: type_key.into(),
            value: value.into(),
            location: location.map(str::to_string),
        }
    }
}
