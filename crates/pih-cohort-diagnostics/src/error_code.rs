//! Cohort error codes following a structured numbering system
//!
//! Error code ranges:
//! - COH0001-COH0099: Configuration errors (definition build and registration)
//! - COH0100-COH0199: Evaluation errors (runtime)
//! - COH0200-COH0299: Data provider errors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a configuration error (0001-0099)
    pub const fn is_configuration_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is an evaluation error (0100-0199)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a data provider error (0200-0299)
    pub const fn is_provider_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COH{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Configuration errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Cohort combination without operands")
            .with_help("AND/OR combinations need at least one sub-cohort"),
    );
    map.insert(
        2,
        ErrorInfo::new("Malformed duration literal")
            .with_help("Use an amount followed by a unit, e.g. '3w', '8 weeks' or '2m'"),
    );
    map.insert(
        3,
        ErrorInfo::new("Unknown metadata reference")
            .with_help("Check the metadata catalog for the referenced name"),
    );
    map.insert(4, ErrorInfo::new("Duplicate cohort key"));
    map.insert(5, ErrorInfo::new("Unknown cohort key"));
    map.insert(
        6,
        ErrorInfo::new("Empty criteria list")
            .with_help("State, type and value lists must name at least one entry"),
    );
    map.insert(7, ErrorInfo::new("Invalid age range"));
    map.insert(
        8,
        ErrorInfo::new("Unknown composition operator")
            .with_help("Supported operators are AND, OR and AND NOT"),
    );
    map.insert(9, ErrorInfo::new("Invalid metadata catalog"));

    // Evaluation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Evaluation cancelled"));
    map.insert(101, ErrorInfo::new("Evaluation timed out"));
    map.insert(
        102,
        ErrorInfo::new("Invalid evaluation context")
            .with_help("The start date must not be after the end date"),
    );
    map.insert(103, ErrorInfo::new("Internal evaluation error"));

    // Data provider errors (0200-0299)
    map.insert(200, ErrorInfo::new("Data provider failure"));

    map
});

// Configuration errors
pub const COH0001: ErrorCode = ErrorCode::new(1);
pub const COH0002: ErrorCode = ErrorCode::new(2);
pub const COH0003: ErrorCode = ErrorCode::new(3);
pub const COH0004: ErrorCode = ErrorCode::new(4);
pub const COH0005: ErrorCode = ErrorCode::new(5);
pub const COH0006: ErrorCode = ErrorCode::new(6);
pub const COH0007: ErrorCode = ErrorCode::new(7);
pub const COH0008: ErrorCode = ErrorCode::new(8);
pub const COH0009: ErrorCode = ErrorCode::new(9);

// Evaluation errors
pub const COH0100: ErrorCode = ErrorCode::new(100);
pub const COH0101: ErrorCode = ErrorCode::new(101);
pub const COH0102: ErrorCode = ErrorCode::new(102);
pub const COH0103: ErrorCode = ErrorCode::new(103);

// Data provider errors
pub const COH0200: ErrorCode = ErrorCode::new(200);
