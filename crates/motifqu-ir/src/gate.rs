//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Only the gate vocabulary needed for amplitude amplification is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// Sign flip of the all-ones pattern across `controls + 1` qubits.
    ///
    /// `MCZ(0)` is a plain Z, `MCZ(1)` is CZ. The gate is symmetric in its
    /// operands, so there is no distinguished target.
    MCZ(u32),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::MCZ(_) => "mcz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X | StandardGate::H => 1,
            StandardGate::MCZ(controls) => controls + 1,
        }
    }
}

/// A gate as it appears in an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: StandardGate,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self { kind: gate }
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::X.num_qubits(), 1);
        assert_eq!(StandardGate::MCZ(0).num_qubits(), 1);
        assert_eq!(StandardGate::MCZ(4).num_qubits(), 5);
    }

    #[test]
    fn test_gate_creation() {
        let h = Gate::standard(StandardGate::H);
        assert_eq!(h.name(), "h");
        assert_eq!(h.num_qubits(), 1);

        let mcz: Gate = StandardGate::MCZ(3).into();
        assert_eq!(mcz.name(), "mcz");
        assert_eq!(mcz.num_qubits(), 4);
    }
}
