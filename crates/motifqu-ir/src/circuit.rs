//! High-level circuit builder API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Summary statistics of a circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    /// Total number of gates. Barriers are not counted.
    pub gate_count: usize,
    /// Number of gate layers.
    pub depth: usize,
    /// Gate counts keyed by gate name.
    pub gate_counts: BTreeMap<String, usize>,
}

impl CircuitStats {
    /// Count of a single gate kind.
    pub fn count(&self, name: &str) -> usize {
        self.gate_counts.get(name).copied().unwrap_or(0)
    }
}

/// A quantum circuit.
///
/// Thin builder over [`CircuitDag`] with one method per supported gate.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::new(),
            next_qubit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.dag.add_qubit(id);
        id
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::H, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::X, qubit))?;
        Ok(self)
    }

    /// Apply Hadamard to every qubit.
    pub fn h_all(&mut self) -> IrResult<&mut Self> {
        for id in self.qubit_ids() {
            self.h(id)?;
        }
        Ok(self)
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply a multi-controlled Z across `qubits`.
    pub fn mcz(&mut self, qubits: &[QubitId]) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::mcz(qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Append an arbitrary instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Apply barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.qubit_ids();
        self.barrier(qubits)
    }

    /// Add `phase` radians to the global phase.
    pub fn add_global_phase(&mut self, phase: f64) -> &mut Self {
        let current = self.dag.global_phase();
        self.dag.set_global_phase(current + phase);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Qubit ids in allocation order.
    pub fn qubit_ids(&self) -> Vec<QubitId> {
        self.dag.qubits().collect()
    }

    /// Get the global phase in radians.
    pub fn global_phase(&self) -> f64 {
        self.dag.global_phase()
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.dag.ops()
    }

    /// Gate count, depth and per-gate tallies.
    pub fn stats(&self) -> CircuitStats {
        let mut gate_counts = BTreeMap::new();
        let mut gate_count = 0usize;
        for inst in self.dag.ops().filter(|i| i.is_gate()) {
            gate_count += 1;
            *gate_counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        CircuitStats {
            gate_count,
            // Builder-constructed DAGs are acyclic.
            depth: self.dag.depth().unwrap_or(0),
            gate_counts,
        }
    }
}
