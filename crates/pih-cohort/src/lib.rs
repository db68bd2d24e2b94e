//! PIH Malawi cohort reporting
//!
//! This crate ties the cohort engine to the HIV program:
//! - Re-exports of the data model, providers and evaluation engine
//! - The metadata catalog and the HIV cohort library, keyed in a registry
//! - Rendering of the HCC register and the HIV visits datasets
//!
//! # Example
//!
//! ```ignore
//! use pih_cohort::{CohortEngine, HivCohortLibrary, HivMetadata, MetadataCatalog};
//!
//! let metadata = HivMetadata::resolve(&MetadataCatalog::hiv_defaults())?;
//! let library = HivCohortLibrary::build(&metadata)?;
//! let on_art = library.get("inOnArtStateAtLocationOnEndDate")?;
//!
//! let engine = CohortEngine::new(sources);
//! let patients = engine.evaluate(&on_art, population, &ctx).await?;
//! ```

// Re-export all public APIs from internal crates
pub use pih_cohort_diagnostics as diagnostics;
pub use pih_cohort_eval as eval;
pub use pih_cohort_model as model;
pub use pih_cohort_types as types;

pub mod library;
pub mod report;

// Convenience re-exports
pub use library::{CohortRegistry, HivCohortLibrary, HivMetadata, MetadataCatalog};
pub use pih_cohort_diagnostics::{ConfigError, ConfigResult};
pub use pih_cohort_eval::{CohortEngine, CohortRef, EngineOptions, EvalError, EvaluationSession};
pub use pih_cohort_model::DataSources;
pub use pih_cohort_types::{EvaluationContext, LocationScope, PatientSet};
pub use report::{HccRegisterRenderer, Row, VisitsDataset};
