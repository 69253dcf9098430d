//! Error types for fail-fast LOPA arithmetic
//!
//! Validation helpers never return these; they aggregate messages into a
//! `ValidationResult` instead. Arithmetic entry points stop at the first
//! invalid value and report it here.

use thiserror::Error;

/// Result type for LOPA calculations
pub type Result<T> = std::result::Result<T, LopaError>;

/// Errors raised by the calculation entry points
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LopaError {
    /// PFD outside the creditable band or not finite
    #[error("invalid PFD {0}: must be a finite value between 1e-5 and 1.0")]
    InvalidPfd(f64),

    /// Total RRF used as a divisor must be positive
    #[error("total risk reduction factor must be positive (got {0})")]
    NonPositiveTotalRrf(f64),

    /// Target mitigated event likelihood used as a divisor must be positive
    #[error("target frequency must be positive (got {0})")]
    NonPositiveTargetFrequency(f64),

    /// Required RRF used as a divisor must be positive
    #[error("required risk reduction factor must be positive (got {0})")]
    NonPositiveRequiredRrf(f64),

    /// Actual RRF used as a divisor must be positive
    #[error("actual risk reduction factor must be positive (got {0})")]
    NonPositiveActualRrf(f64),

    /// Scenario input failed validation
    #[error("LOPA input validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}
