//! Phase oracle synthesis.
//!
//! The oracle flips the sign of every marked basis state and leaves all
//! others unchanged. Each marked index gets its own gate sequence:
//!
//! 1. X on every qubit whose bit is 0, mapping the index to all-ones.
//! 2. One multi-controlled Z over the whole register.
//! 3. The same X gates again.
//!
//! Gate count is `O(|M| · n)`. Sequences are independent and concatenated in
//! ascending index order, so the same [`OracleSpec`] always yields the same
//! circuit.

use motifqu_ir::{Circuit, Instruction, IrResult, QubitId, StandardGate};

use crate::classifier::MarkedSet;
use crate::encoder::EncodedIndex;
use crate::error::{MotifError, MotifResult};

/// Everything that determines an oracle circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleSpec {
    marked: MarkedSet,
    num_qubits: u32,
    reachable: u64,
}

impl OracleSpec {
    /// Create a spec. Every marked index must fit in `num_qubits` bits.
    pub fn new(marked: MarkedSet, num_qubits: u32) -> MotifResult<Self> {
        if num_qubits == 0 {
            return Err(MotifError::InvalidParameter(
                "oracle needs at least one qubit".into(),
            ));
        }
        if let Some(&last) = marked.iter().next_back() {
            if num_qubits < u64::BITS && last >> num_qubits != 0 {
                return Err(MotifError::InvalidParameter(format!(
                    "marked index {last} does not fit in {num_qubits} qubits"
                )));
            }
        }
        Ok(Self {
            marked,
            num_qubits,
            reachable: 1u64 << num_qubits,
        })
    }

    /// Restrict the candidates to the first `reachable` indices; the rest
    /// are padding that can never be marked.
    pub fn with_reachable(mut self, reachable: u64) -> MotifResult<Self> {
        if reachable == 0 || reachable > self.size() {
            return Err(MotifError::InvalidParameter(format!(
                "{reachable} reachable states in a register of {}",
                self.size()
            )));
        }
        if let Some(&last) = self.marked.iter().next_back() {
            if last >= reachable {
                return Err(MotifError::InvalidParameter(format!(
                    "marked index {last} is padding beyond {reachable} reachable states"
                )));
            }
        }
        self.reachable = reachable;
        Ok(self)
    }

    /// The marked set.
    pub fn marked(&self) -> &MarkedSet {
        &self.marked
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// `N = 2^n`.
    pub fn size(&self) -> u64 {
        1u64 << self.num_qubits
    }

    /// Indices that map to a candidate, `N` unless restricted.
    pub fn reachable(&self) -> u64 {
        self.reachable
    }
}

/// Gate sequence that flips the sign of a single basis state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedGateSequence {
    index: EncodedIndex,
    instructions: Vec<Instruction>,
}

impl MarkedGateSequence {
    /// Build the sequence marking `index` on an `n`-qubit register.
    pub fn for_index(index: EncodedIndex, num_qubits: u32) -> Self {
        let flips: Vec<QubitId> = (0..num_qubits)
            .map(QubitId)
            .filter(|q| index & q.mask() == 0)
            .collect();
        let all: Vec<QubitId> = (0..num_qubits).map(QubitId).collect();

        let mut instructions = Vec::with_capacity(2 * flips.len() + 1);
        instructions.extend(
            flips
                .iter()
                .map(|&q| Instruction::single_qubit_gate(StandardGate::X, q)),
        );
        instructions.push(Instruction::mcz(&all));
        instructions.extend(
            flips
                .iter()
                .map(|&q| Instruction::single_qubit_gate(StandardGate::X, q)),
        );

        Self {
            index,
            instructions,
        }
    }

    /// The index this sequence marks.
    pub fn index(&self) -> EncodedIndex {
        self.index
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of X gates (both sides together).
    pub fn num_flips(&self) -> usize {
        self.instructions.len() - 1
    }
}

/// A fixed operator that can be appended to a circuit.
pub trait Operator {
    /// Register width the operator acts on.
    fn num_qubits(&self) -> u32;

    /// Append the operator to `circuit`.
    fn append_to(&self, circuit: &mut Circuit) -> IrResult<()>;

    /// The operator alone, on a fresh register.
    fn to_circuit(&self, name: &str) -> IrResult<Circuit> {
        let mut circuit = Circuit::with_size(name, self.num_qubits());
        self.append_to(&mut circuit)?;
        Ok(circuit)
    }
}

/// Oracle built from one [`MarkedGateSequence`] per marked index.
#[derive(Debug, Clone)]
pub struct PhaseOracle {
    num_qubits: u32,
    records: Vec<MarkedGateSequence>,
}

impl PhaseOracle {
    /// Synthesize the oracle for `spec`.
    pub fn build(spec: &OracleSpec) -> Self {
        let records = spec
            .marked()
            .iter()
            .map(|&index| MarkedGateSequence::for_index(index, spec.num_qubits()))
            .collect();
        Self {
            num_qubits: spec.num_qubits(),
            records,
        }
    }

    /// Per-index records, ascending.
    pub fn records(&self) -> &[MarkedGateSequence] {
        &self.records
    }

    /// Total instruction count.
    pub fn gate_count(&self) -> usize {
        self.records.iter().map(|r| r.instructions().len()).sum()
    }
}

impl Operator for PhaseOracle {
    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn append_to(&self, circuit: &mut Circuit) -> IrResult<()> {
        for record in &self.records {
            for inst in record.instructions() {
                circuit.append(inst.clone())?;
            }
        }
        Ok(())
    }
}
