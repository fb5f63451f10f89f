//! The Grover diffuser: inversion about the mean.

use std::f64::consts::PI;

use motifqu_ir::{Circuit, IrResult, QubitId};

use crate::oracle::Operator;

/// `2|s⟩⟨s| − I` on an `n`-qubit register.
///
/// Built as H-all, X-all, MCZ over the register, X-all, H-all. That product
/// is `I − 2|s⟩⟨s|`; a global phase of π turns it into the reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diffuser {
    num_qubits: u32,
}

impl Diffuser {
    /// Diffuser for an `n`-qubit register.
    pub fn new(num_qubits: u32) -> Self {
        Self { num_qubits }
    }
}

impl Operator for Diffuser {
    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn append_to(&self, circuit: &mut Circuit) -> IrResult<()> {
        let qubits: Vec<QubitId> = (0..self.num_qubits).map(QubitId).collect();
        for &q in &qubits {
            circuit.h(q)?;
        }
        for &q in &qubits {
            circuit.x(q)?;
        }
        circuit.mcz(&qubits)?;
        for &q in &qubits {
            circuit.x(q)?;
        }
        for &q in &qubits {
            circuit.h(q)?;
        }
        circuit.add_global_phase(PI);
        Ok(())
    }
}
