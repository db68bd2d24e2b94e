//! Cohort definition libraries
//!
//! - `metadata`: the catalog of known names and the resolved HIV metadata
//! - `registry`: keyed, ordered storage of shared definitions
//! - `hiv`: the documented HIV cohorts and their convenience constructors

pub mod hiv;
pub mod metadata;
pub mod registry;

pub use hiv::HivCohortLibrary;
pub use metadata::{HivMetadata, MetadataCatalog, ProgramMetadata};
pub use registry::{CohortRegistry, HIV_PREFIX};
