//! Configuration error type

use crate::{
    COH0001, COH0002, COH0003, COH0004, COH0005, COH0006, COH0007, COH0008, COH0009, ErrorCode,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of metadata a definition can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataKind {
    IdentifierType,
    Workflow,
    WorkflowState,
    EncounterType,
    Concept,
    Location,
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKind::IdentifierType => write!(f, "identifier type"),
            MetadataKind::Workflow => write!(f, "workflow"),
            MetadataKind::WorkflowState => write!(f, "workflow state"),
            MetadataKind::EncounterType => write!(f, "encounter type"),
            MetadataKind::Concept => write!(f, "concept"),
            MetadataKind::Location => write!(f, "location"),
        }
    }
}

/// Errors detected while building or registering cohort definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// AND/OR combination built with zero operands
    #[error("{code}: {combinator} requires at least one operand", code = COH0001)]
    EmptyOperands { combinator: String },

    /// Duration literal could not be parsed
    #[error("{code}: malformed duration literal '{literal}': {reason}", code = COH0002)]
    MalformedDuration { literal: String, reason: String },

    /// Reference to metadata that the catalog does not know
    #[error("{code}: unknown {kind} '{name}'", code = COH0003)]
    UnknownMetadata { kind: MetadataKind, name: String },

    /// Key registered twice
    #[error("{code}: cohort key '{key}' is already registered", code = COH0004)]
    DuplicateKey { key: String },

    /// Lookup of a key that is not registered
    #[error("{code}: no cohort registered under '{key}'", code = COH0005)]
    UnknownCohort { key: String },

    /// A state, type or value list that must not be empty
    #[error("{code}: {what} must not be empty", code = COH0006)]
    EmptyCriteria { what: String },

    /// Age bounds that can never be satisfied
    #[error("{code}: invalid age range: {message}", code = COH0007)]
    InvalidAgeRange { message: String },

    /// Unrecognised token in a textual composition chain
    #[error("{code}: unknown composition operator '{token}'", code = COH0008)]
    UnknownOperator { token: String },

    /// Metadata catalog that could not be loaded
    #[error("{code}: invalid metadata catalog: {message}", code = COH0009)]
    InvalidCatalog { message: String },
}

impl ConfigError {
    /// Create an empty operands error
    pub fn empty_operands(combinator: impl Into<String>) -> Self {
        Self::EmptyOperands {
            combinator: combinator.into(),
        }
    }

    /// Create a malformed duration error
    pub fn malformed_duration(literal: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDuration {
            literal: literal.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown metadata error
    pub fn unknown_metadata(kind: MetadataKind, name: impl Into<String>) -> Self {
        Self::UnknownMetadata {
            kind,
            name: name.into(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Create an unknown cohort error
    pub fn unknown_cohort(key: impl Into<String>) -> Self {
        Self::UnknownCohort { key: key.into() }
    }

    /// Create an empty criteria error
    pub fn empty_criteria(what: impl Into<String>) -> Self {
        Self::EmptyCriteria { what: what.into() }
    }

    /// Create an invalid age range error
    pub fn invalid_age_range(message: impl Into<String>) -> Self {
        Self::InvalidAgeRange {
            message: message.into(),
        }
    }

    /// Create an unknown operator error
    pub fn unknown_operator(token: impl Into<String>) -> Self {
        Self::UnknownOperator {
            token: token.into(),
        }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyOperands { .. } => COH0001,
            Self::MalformedDuration { .. } => COH0002,
            Self::UnknownMetadata { .. } => COH0003,
            Self::DuplicateKey { .. } => COH0004,
            Self::UnknownCohort { .. } => COH0005,
            Self::EmptyCriteria { .. } => COH0006,
            Self::InvalidAgeRange { .. } => COH0007,
            Self::UnknownOperator { .. } => COH0008,
            Self::InvalidCatalog { .. } => COH0009,
        }
    }

    /// Help text for the error code, if any
    pub fn help(&self) -> Option<&'static str> {
        self.code().info().help
    }
}
