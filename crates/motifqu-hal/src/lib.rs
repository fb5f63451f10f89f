//! MotifQu Backend Abstraction Layer
//!
//! A common interface between the amplitude amplification engine and
//! whatever evaluates its circuits.
//!
//! # Overview
//!
//! - A [`Backend`] trait: introspection, validation and execution
//! - [`Capabilities`] to describe qubit ceilings and gate support
//! - [`ExecutionResult`] and [`Counts`] for exact or sampled outcomes
//! - A [`BackendRegistry`] for creating backends by name
//!
//! # Implementing a Custom Backend
//!
//! ```ignore
//! use motifqu_hal::{
//!     Backend, BackendAvailability, Capabilities, ExecutionResult, HalResult,
//! };
//! use motifqu_ir::Circuit;
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     fn capabilities(&self) -> &Capabilities {
//!         &self.capabilities
//!     }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     async fn execute(&self, circuit: &Circuit) -> HalResult<ExecutionResult> {
//!         // Evaluate the circuit
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod registry;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult, bitstring_to_index, index_to_bitstring};
