//! Execution results.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement counts keyed by bitstring.
///
/// Bitstrings are written qubit 0 first, so on three qubits `"011"` is
/// basis index 6.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty count table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no outcome was observed.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Outcomes sorted by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Convert to an empirical distribution over `2^num_qubits` basis
    /// indices. Outcomes that are not a binary string of the register width
    /// are ignored.
    pub fn to_distribution(&self, num_qubits: u32) -> Vec<f64> {
        let size = 1usize << num_qubits;
        let mut dist = vec![0.0; size];
        let total = self.total_shots();
        if total == 0 {
            return dist;
        }
        for (bitstring, &count) in &self.counts {
            if let Some(index) = bitstring_to_index(bitstring, num_qubits) {
                dist[index] += count as f64 / total as f64;
            }
        }
        dist
    }
}

/// Format a basis index as a qubit-0-first bitstring.
pub fn index_to_bitstring(index: usize, num_qubits: u32) -> String {
    (0..num_qubits)
        .map(|q| if (index >> q) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Parse a qubit-0-first bitstring back into a basis index.
pub fn bitstring_to_index(bitstring: &str, num_qubits: u32) -> Option<usize> {
    if bitstring.len() != num_qubits as usize {
        return None;
    }
    bitstring
        .bytes()
        .enumerate()
        .try_fold(0usize, |acc, (q, b)| match b {
            b'0' => Some(acc),
            b'1' => Some(acc | (1 << q)),
            _ => None,
        })
}

/// Result of executing a circuit on a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome probability per basis index, length `2^n`.
    ///
    /// Exact for statevector execution; the empirical frequency when the
    /// backend sampled shots.
    pub probabilities: Vec<f64>,
    /// Final amplitudes, when the backend exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitudes: Option<Vec<Complex64>>,
    /// Raw measurement counts, when the backend sampled shots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    /// Number of shots taken, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shots: Option<u32>,
    /// Wall-clock execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create an exact result from a probability vector.
    pub fn exact(probabilities: Vec<f64>) -> Self {
        Self {
            probabilities,
            amplitudes: None,
            counts: None,
            shots: None,
            execution_time_ms: None,
        }
    }

    /// Create a sampled result from measurement counts.
    pub fn sampled(counts: Counts, num_qubits: u32, shots: u32) -> Self {
        Self {
            probabilities: counts.to_distribution(num_qubits),
            amplitudes: None,
            counts: Some(counts),
            shots: Some(shots),
            execution_time_ms: None,
        }
    }

    /// Attach final amplitudes.
    #[must_use]
    pub fn with_amplitudes(mut self, amplitudes: Vec<Complex64>) -> Self {
        self.amplitudes = Some(amplitudes);
        self
    }

    /// Attach execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Whether the probabilities are exact rather than sampled.
    pub fn is_exact(&self) -> bool {
        self.shots.is_none()
    }
}
