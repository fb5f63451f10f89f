//! Error types for the MotifQu core.

use motifqu_hal::HalError;
use motifqu_ir::IrError;
use thiserror::Error;

/// Errors that can occur while classifying, amplifying or decoding.
///
/// Per-window alphabet problems inside the genome never surface here; the
/// classifier skips those windows. Everything below is fatal for a run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MotifError {
    /// A symbol outside {A, C, G, T} where exact indexing is required.
    #[error("Invalid symbol '{symbol}' at position {position} in {context}")]
    InvalidAlphabet {
        /// What was being validated, e.g. "query motif".
        context: String,
        /// The offending symbol.
        symbol: char,
        /// Zero-based position of the symbol.
        position: usize,
    },

    /// The register would need more qubits than the configured ceiling.
    #[error("Search space needs {requested} qubits, exceeding the ceiling of {ceiling}")]
    QubitCeilingExceeded {
        /// Qubits the search space needs.
        requested: u32,
        /// Configured or backend-imposed ceiling.
        ceiling: u32,
    },

    /// Motif or k-mer longer than the sequence it is scanned against.
    #[error("Pattern length {length} exceeds genome length {genome_length}")]
    MotifLongerThanGenome {
        /// Motif length or k.
        length: usize,
        /// Length of the genome.
        genome_length: usize,
    },

    /// Invalid mode parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The genome has no sequence.
    #[error("Sequence is empty")]
    EmptySequence,

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Circuit construction failed.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),

    /// Backend failure, surfaced verbatim.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// A symbol that is not an IUPAC nucleotide code.
    #[error("Invalid IUPAC symbol '{symbol}'")]
    InvalidIupac {
        /// The offending symbol.
        symbol: char,
    },

    /// IUPAC expansion would produce more sequences than allowed.
    #[error("Pattern {pattern} expands to {count} sequences, limit is {limit}")]
    ExpansionTooLarge {
        /// The pattern being expanded.
        pattern: String,
        /// Number of sequences it would produce.
        count: u128,
        /// Configured limit.
        limit: usize,
    },

    /// No catalog entry with this name.
    #[error("Unknown motif: {0}")]
    UnknownMotif(String),
}

/// Result type for MotifQu operations.
pub type MotifResult<T> = Result<T, MotifError>;
