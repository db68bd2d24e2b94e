//! Cohort data model
//!
//! Read-only shapes consumed by the cohort engine: patients and their identifiers,
//! program workflow state spans, encounters, observations, and the evaluation
//! context a cohort is evaluated against. Also defines the duration literals and
//! age units used by temporal predicates.

pub mod age;
pub mod clinical;
pub mod context;
pub mod duration;
pub mod patient;
pub mod state;

pub use age::{Age, AgeRange, AgeUnit};
pub use clinical::{Encounter, ObsValue, Observation};
pub use context::{EvaluationContext, LocationScope};
pub use duration::{DurationLiteral, DurationUnit};
pub use patient::{Identifier, Patient, PatientId, PatientSet};
pub use state::{Outcome, StateRef, StateSpan};

/// Small inline list used for type, state and concept filters
pub type KeyList = smallvec::SmallVec<[String; 4]>;
