//! MotifQu Local Statevector Simulator
//!
//! Dense statevector simulation of amplitude amplification circuits. The
//! exact mode returns amplitudes and probabilities with no sampling noise;
//! the shot mode samples the final state and returns an empirical
//! distribution, standing in for hardware.
//!
//! # Memory
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 16 | ~1 MB |
//! | 20 | ~16 MB |
//! | 25 | ~512 MB |
//!
//! # Example
//!
//! ```ignore
//! use motifqu_adapter_sim::SimulatorBackend;
//! use motifqu_hal::Backend;
//! use motifqu_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new();
//!
//!     let mut circuit = Circuit::with_size("uniform", 4);
//!     circuit.h_all()?;
//!     let result = backend.execute(&circuit).await?;
//!
//!     // 16 outcomes at 1/16 each
//!     println!("{:?}", result.probabilities);
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, SimulationMode, SimulatorBackend};
pub use statevector::Statevector;
