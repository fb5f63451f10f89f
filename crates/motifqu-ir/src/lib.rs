//! MotifQu Circuit Intermediate Representation
//!
//! This crate provides the data structures used to describe the amplitude
//! amplification circuits that MotifQu synthesizes from a marked set of
//! genomic basis states.
//!
//! # Overview
//!
//! Circuits are stored as a wire DAG ([`CircuitDag`]) so depth and gate
//! statistics can be reported for diagnostics. The [`Circuit`] type wraps the
//! DAG with a builder API for the handful of gates amplitude amplification
//! needs: Hadamard, Pauli X and multi-controlled Z.
//!
//! # Example: Marking a single basis state
//!
//! ```rust
//! use motifqu_ir::{Circuit, QubitId};
//!
//! // Flip the sign of |101⟩ on a 3-qubit register (qubit 0 is the LSB).
//! let mut circuit = Circuit::with_size("mark_5", 3);
//! circuit.x(QubitId(1)).unwrap();
//! circuit.mcz(&[QubitId(0), QubitId(1), QubitId(2)]).unwrap();
//! circuit.x(QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.stats().gate_count, 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X` | 1 | Pauli-X gate |
//! | `MCZ(c)` | c + 1 | Sign flip on the all-ones pattern |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, CircuitStats};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::{Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::QubitId;
