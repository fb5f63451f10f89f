//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Backend is not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit exceeds backend capabilities.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Invalid number of shots.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Outcome distribution does not cover the register.
    #[error("Backend returned {got} probabilities for {expected} basis states")]
    DistributionLength {
        /// `2^n` for an n-qubit circuit.
        expected: u64,
        /// Entries actually returned.
        got: usize,
    },
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
