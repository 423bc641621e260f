//! # Error Types
//!
//! Structured error types for loads_core. Every variant carries enough
//! context (field name, offending value, load case index, path) for a
//! calling agent or engineer to report a precise diagnostic. Errors are
//! serializable so they can be handed back over JSON unchanged.
//!
//! ## Example
//!
//! ```rust
//! use loads_core::errors::{LoadError, LoadResult};
//!
//! fn check_factor(factor: f64) -> LoadResult<()> {
//!     if !factor.is_finite() {
//!         return Err(LoadError::validation(
//!             "factor",
//!             factor.to_string(),
//!             "Scale factor must be finite",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_factor(1.5).is_ok());
//! assert_eq!(check_factor(f64::NAN).unwrap_err().error_code(), "VALIDATION_ERROR");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::Units;

/// Result type alias for loads_core operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Structured error type for LoadSet operations.
///
/// None of these are retried internally; each is reported once and
/// propagated to the caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LoadError {
    /// Malformed or incomplete input (missing field, wrong enum value, bad number)
    #[error("Validation error for '{field}': {value} - {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// Unit identifier outside the recognized enumeration
    #[error("Invalid unit for '{field}': '{value}' (expected one of {expected})")]
    InvalidUnit {
        field: String,
        value: String,
        expected: String,
    },

    /// Two LoadSets declare different units and cannot be compared directly
    #[error("Unit mismatch: {left} vs {right} - convert one LoadSet before comparing")]
    UnitMismatch { left: Units, right: Units },

    /// Two load cases sanitize to the same export file name
    #[error("Duplicate export name '{file_name}' for load cases {first_index} and {second_index}")]
    DuplicateExportName {
        file_name: String,
        first_index: usize,
        second_index: usize,
    },

    /// Directory or file could not be created, read or written
    #[error("I/O failure: {operation} on '{path}' - {reason}")]
    IoFailure {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON or TOML (de)serialization failed outside of input validation
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl LoadError {
    /// Create a Validation error
    pub fn validation(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidUnit error
    pub fn invalid_unit(field: impl Into<String>, value: impl Into<String>, expected: impl Into<String>) -> Self {
        LoadError::InvalidUnit {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an IoFailure error
    pub fn io_failure(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::IoFailure {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Serialization error
    pub fn serialization(reason: impl Into<String>) -> Self {
        LoadError::Serialization {
            reason: reason.into(),
        }
    }

    /// Map a serde_json parse failure of an input document to a Validation error.
    ///
    /// serde reports the offending field inside its message, and the
    /// line/column pinpoints it in the source document.
    pub(crate) fn from_json_input(err: &serde_json::Error) -> Self {
        LoadError::validation(
            "document",
            format!("line {}, column {}", err.line(), err.column()),
            err.to_string(),
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LoadError::Validation { .. } => "VALIDATION_ERROR",
            LoadError::InvalidUnit { .. } => "INVALID_UNIT",
            LoadError::UnitMismatch { .. } => "UNIT_MISMATCH",
            LoadError::DuplicateExportName { .. } => "DUPLICATE_EXPORT_NAME",
            LoadError::IoFailure { .. } => "IO_FAILURE",
            LoadError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ForceUnit, MomentUnit};

    #[test]
    fn test_error_serialization() {
        let error = LoadError::invalid_unit("forces", "kip", "N, kN, lbf, klbf");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidUnit\""));
        let roundtrip: LoadError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LoadError::validation("version", "x", "bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(LoadError::io_failure("write", "/tmp/x", "denied").error_code(), "IO_FAILURE");
        let mismatch = LoadError::UnitMismatch {
            left: Units::new(ForceUnit::N, MomentUnit::Nm),
            right: Units::new(ForceUnit::Lbf, MomentUnit::LbfFt),
        };
        assert_eq!(mismatch.error_code(), "UNIT_MISMATCH");
    }

    #[test]
    fn test_unit_mismatch_message_names_both_systems() {
        let mismatch = LoadError::UnitMismatch {
            left: Units::new(ForceUnit::N, MomentUnit::Nm),
            right: Units::new(ForceUnit::KN, MomentUnit::KNm),
        };
        let message = mismatch.to_string();
        assert!(message.contains("N/Nm"));
        assert!(message.contains("kN/kNm"));
    }

    #[test]
    fn test_duplicate_name_message() {
        let err = LoadError::DuplicateExportName {
            file_name: "run_Case_1.inp".to_string(),
            first_index: 0,
            second_index: 2,
        };
        assert_eq!(
            err.to_string(),
            "Duplicate export name 'run_Case_1.inp' for load cases 0 and 2"
        );
    }
}
