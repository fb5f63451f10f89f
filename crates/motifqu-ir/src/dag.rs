//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a qubit wire.
    In(QubitId),
    /// Output node for a qubit wire.
    Out(QubitId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// An edge in the circuit DAG representing a qubit wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge belongs to.
    pub qubit: QubitId,
}

/// DAG-based circuit representation.
///
/// Nodes are wire inputs, wire outputs, or operations; edges are wire
/// segments. Each wire runs from its `In` node through every operation that
/// touches it to its `Out` node.
///
/// Operations are never removed, so application order is preserved in
/// `op_order` and is itself a valid topological order.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Map from qubit to its input node.
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from qubit to its output node.
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<QubitId, NodeIndex>,
    /// Operation nodes in application order.
    op_order: Vec<NodeIndex>,
    /// Global phase of the circuit, in radians.
    global_phase: f64,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            op_order: Vec::new(),
            global_phase: 0.0,
        }
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let in_node = self.graph.add_node(DagNode::In(qubit));
        let out_node = self.graph.add_node(DagNode::Out(qubit));
        self.graph.add_edge(in_node, out_node, DagEdge { qubit });
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
        self.wire_front.insert(qubit, in_node);
    }

    /// Apply an instruction to the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            InstructionKind::Barrier => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if got == 0 {
                return Err(IrError::EmptyOperands(gate.name().to_string()));
            }
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let qubits = instruction.qubits.clone();
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for qubit in qubits {
            let out_node = self.qubit_outputs[&qubit];
            let prev_node = self.wire_front[&qubit];

            let edge_id = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().qubit == qubit && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {qubit}"
                    ))
                })?;
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(prev_node, op_node, DagEdge { qubit });
            self.graph.add_edge(op_node, out_node, DagEdge { qubit });
            self.wire_front.insert(qubit, op_node);
        }

        self.op_order.push(op_node);
        Ok(op_node)
    }

    /// Iterate over operations in application order.
    pub fn ops(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.op_order
            .iter()
            .filter_map(|&idx| self.graph[idx].instruction())
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Calculate the circuit depth. Barriers do not count as a layer.
    pub fn depth(&self) -> IrResult<usize> {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        let order = petgraph::algo::toposort(&self.graph, None)
            .map_err(|_| IrError::InvalidDag("cycle detected in circuit graph".into()))?;

        for node in order {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let counts_as_layer = matches!(
                &self.graph[node],
                DagNode::Op(inst) if inst.is_gate()
            );
            let node_depth = max_pred_depth + usize::from(counts_as_layer);

            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        Ok(max_depth)
    }

    /// Iterate over qubits in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        let mut ids: Vec<_> = self.qubit_inputs.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.ops().count(), 0);
        assert_eq!(dag.depth().unwrap(), 0);
    }

    #[test]
    fn test_apply_gate() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));

        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();

        assert_eq!(dag.ops().count(), 1);
        assert_eq!(dag.depth().unwrap(), 1);
    }

    #[test]
    fn test_parallel_gates_depth() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(1)))
            .unwrap();

        assert_eq!(dag.ops().count(), 2);
        assert_eq!(dag.depth().unwrap(), 1);
    }

    #[test]
    fn test_mcz_serializes_wires() {
        let mut dag = CircuitDag::new();
        for q in 0..3 {
            dag.add_qubit(QubitId(q));
        }
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::mcz(&[QubitId(0), QubitId(1), QubitId(2)]))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(2)))
            .unwrap();

        assert_eq!(dag.depth().unwrap(), 3);
    }

    #[test]
    fn test_barrier_does_not_add_depth() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::barrier([QubitId(0)])).unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();

        assert_eq!(dag.ops().count(), 3);
        assert_eq!(dag.depth().unwrap(), 2);
    }

    #[test]
    fn test_ops_preserve_application_order() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();

        let names: Vec<_> = dag.ops().map(Instruction::name).collect();
        assert_eq!(names, vec!["x", "h"]);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        let bad = Instruction::gate(StandardGate::MCZ(1), [QubitId(0)]);
        let err = dag.apply(bad).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_qubit_not_found_with_context() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));

        let err = dag
            .apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(5)))
            .unwrap_err();
        assert!(err.to_string().contains("gate: h"));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        let err = dag
            .apply(Instruction::mcz(&[QubitId(0), QubitId(0)]))
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_empty_mcz_rejected() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        let err = dag.apply(Instruction::mcz(&[])).unwrap_err();
        assert!(matches!(err, IrError::EmptyOperands(_)));
    }
}
