//! # Error Types
//!
//! Structured error types for beam_core. Every failure names the offending
//! input or the (combination, pattern) pair it belongs to, so that a caller
//! can point the user at the value that needs correcting. Nothing in this
//! crate retries: all inputs are deterministic and a failure recurs
//! identically until the data is fixed.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{CalcError, CalcResult};
//!
//! fn validate_span(length_m: f64) -> CalcResult<()> {
//!     if length_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "length_m",
//!             length_m.to_string(),
//!             "Span length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for beam_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for analysis operations.
///
/// Meshing, element and combination-generation errors are fatal for a run.
/// Errors for which [`CalcError::is_evaluation_local`] returns true only
/// invalidate one (combination, pattern) evaluation; the runner logs them and
/// excludes that pair from the envelope.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Degenerate geometry or settings: no beam can be built from them
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// An element, load or action parameter is out of range
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The supports do not prevent rigid-body motion
    #[error("Singular system: {reason}")]
    SingularSystem { reason: String },

    /// A ψ factor, load-duration class or material value could not be resolved
    #[error("Missing coefficient for '{key}': {reason}")]
    MissingCoefficient { key: String, reason: String },

    /// Field results were requested before a successful solve
    #[error("Results not available: {reason}")]
    Precompute { reason: String },

    /// The input asks for something this engine does not model
    #[error("Not supported: {feature}")]
    NotSupported { feature: String },

    /// The caller cancelled the run between two evaluations
    #[error("Analysis cancelled after {completed} of {total} evaluations")]
    Cancelled { completed: usize, total: usize },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a Configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        CalcError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a SingularSystem error
    pub fn singular_system(reason: impl Into<String>) -> Self {
        CalcError::SingularSystem {
            reason: reason.into(),
        }
    }

    /// Create a MissingCoefficient error
    pub fn missing_coefficient(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::MissingCoefficient {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Precompute error
    pub fn precompute(reason: impl Into<String>) -> Self {
        CalcError::Precompute {
            reason: reason.into(),
        }
    }

    /// Create a NotSupported error
    pub fn not_supported(feature: impl Into<String>) -> Self {
        CalcError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal {
            message: message.into(),
        }
    }

    /// True if the error only invalidates a single (combination, pattern)
    /// evaluation and the rest of the run can still produce results
    pub fn is_evaluation_local(&self) -> bool {
        matches!(
            self,
            CalcError::SingularSystem { .. } | CalcError::Precompute { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Configuration { .. } => "CONFIGURATION_ERROR",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::SingularSystem { .. } => "SINGULAR_SYSTEM",
            CalcError::MissingCoefficient { .. } => "MISSING_COEFFICIENT",
            CalcError::Precompute { .. } => "PRECOMPUTE_ERROR",
            CalcError::NotSupported { .. } => "NOT_SUPPORTED",
            CalcError::Cancelled { .. } => "CANCELLED",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
