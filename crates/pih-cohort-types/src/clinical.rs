//! Encounters and observations

use crate::patient::PatientId;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A clinical encounter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Encounter {
    pub encounter_id: u64,
    pub patient_id: PatientId,
    pub encounter_type: String,
    pub location: Option<String>,
    pub datetime: NaiveDateTime,
}

impl Encounter {
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

/// Value of an observation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObsValue {
    /// Coded answer, by concept name
    Coded(String),
    Numeric(Decimal),
    Text(String),
}

impl ObsValue {
    pub fn as_coded(&self) -> Option<&str> {
        match self {
            Self::Coded(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<Decimal> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ObsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coded(concept) => write!(f, "{concept}"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A recorded observation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub patient_id: PatientId,
    pub concept: String,
    /// Type of the encounter the observation was recorded in, if any
    pub encounter_type: Option<String>,
    pub location: Option<String>,
    pub value: ObsValue,
    pub datetime: NaiveDateTime,
}

impl Observation {
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}
