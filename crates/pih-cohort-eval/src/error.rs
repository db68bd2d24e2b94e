//! Evaluation errors for the cohort engine

use pih_cohort_diagnostics::{COH0100, COH0101, COH0102, COH0103, COH0200, ConfigError, ErrorCode};
use pih_cohort_model::ProviderError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while evaluating a cohort
///
/// Absent data is never an error; these are failures that abort the whole
/// evaluation. Partial results are not returned.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    /// A data provider call failed
    #[error("{code}: data provider error: {0}", code = COH0200)]
    Provider(#[from] ProviderError),

    /// The evaluation was cancelled through its cancellation flag
    #[error("{code}: evaluation cancelled", code = COH0100)]
    Cancelled,

    /// Evaluation deadline exceeded
    #[error("{code}: evaluation timed out after {seconds} seconds", code = COH0101)]
    Timeout { seconds: u64 },

    /// Context that no cohort can be evaluated against
    #[error("{code}: invalid evaluation context: {message}", code = COH0102)]
    InvalidContext { message: String },

    /// Configuration problem surfaced through an evaluation entry point
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal error (should not happen)
    #[error("{code}: internal evaluation error: {message}", code = COH0103)]
    Internal { message: String },
}

impl EvalError {
    /// Create an invalid context error
    pub fn invalid_context(message: impl Into<String>) -> Self {
        Self::InvalidContext {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The diagnostic code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Provider(_) => COH0200,
            Self::Cancelled => COH0100,
            Self::Timeout { .. } => COH0101,
            Self::InvalidContext { .. } => COH0102,
            Self::Config(e) => e.code(),
            Self::Internal { .. } => COH0103,
        }
    }

    /// Whether the failure came from the data store rather than the engine
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}
