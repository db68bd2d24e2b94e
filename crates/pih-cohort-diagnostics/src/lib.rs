//! Cohort diagnostics and error handling
//!
//! This crate provides the structured error codes shared by the cohort crates and
//! the configuration error raised while cohort definitions are being built.
//! Configuration errors are always reported at build/registration time and never
//! surface in the middle of an evaluation.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for cohort definition construction
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
