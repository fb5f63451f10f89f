//! Backend capability introspection.
//!
//! Describes what an execution backend can do: qubit ceiling, supported
//! gates and shot limits. The amplification engine checks these before it
//! builds a circuit so that oversized search spaces fail early.

use serde::{Deserialize, Serialize};

/// Capabilities of an execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Maximum number of shots per execution. Zero for exact-only backends.
    pub max_shots: u32,
    /// Whether this is a simulator.
    pub is_simulator: bool,
    /// Additional capability flags: `"statevector"`, `"amplitudes"`,
    /// `"sampling"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a dense statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::amplification(),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec!["statevector".into(), "amplitudes".into(), "sampling".into()],
        }
    }

    /// Rename the backend these capabilities describe.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check whether a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend.
///
/// Multi-controlled gates are listed under `multi_qubit` and accept any
/// number of controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Gates with a variable number of operands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_qubit: Vec<String>,
}

impl GateSet {
    /// The gate vocabulary of amplitude amplification circuits.
    pub fn amplification() -> Self {
        Self {
            single_qubit: vec!["x".into(), "h".into()],
            multi_qubit: vec!["mcz".into()],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.names().any(|g| g == gate)
    }

    /// Every supported gate name.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.single_qubit
            .iter()
            .chain(&self.multi_qubit)
            .map(String::as_str)
    }
}
