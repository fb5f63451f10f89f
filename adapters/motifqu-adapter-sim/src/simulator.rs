//! Simulator backend implementation.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

use motifqu_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, index_to_bitstring,
};
use motifqu_ir::Circuit;

use crate::statevector::Statevector;

/// Default qubit ceiling for dense statevector simulation.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// How the simulator reports outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMode {
    /// Exact probabilities and amplitudes, no sampling noise.
    Exact,
    /// Empirical distribution from `shots` samples of the final state.
    Shots {
        /// Number of samples.
        shots: u32,
        /// RNG seed; `None` draws from OS entropy.
        seed: Option<u64>,
    },
}

/// Local simulator backend.
///
/// Simulates circuits with a dense statevector, so memory grows as
/// `16 · 2^n` bytes; the default ceiling of 20 qubits keeps a run under
/// 20 MB.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Exact or sampling mode.
    mode: SimulationMode,
    /// Sampling RNG, shared across executions so a seeded backend yields a
    /// reproducible sequence of runs.
    rng: Mutex<Option<StdRng>>,
}

impl SimulatorBackend {
    /// Create an exact simulator with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create an exact simulator with a custom qubit ceiling.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(
            BackendConfig::new("statevector"),
            max_qubits,
            SimulationMode::Exact,
        )
    }

    /// Create a sampling simulator that returns empirical distributions.
    pub fn sampling(shots: u32, seed: Option<u64>) -> HalResult<Self> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        Ok(Self::build(
            BackendConfig::new("sampler"),
            DEFAULT_MAX_QUBITS,
            SimulationMode::Shots { shots, seed },
        ))
    }

    fn build(config: BackendConfig, max_qubits: u32, mode: SimulationMode) -> Self {
        let capabilities = Capabilities::simulator(max_qubits).with_name(config.name.clone());
        let rng = match mode {
            SimulationMode::Shots {
                seed: Some(seed), ..
            } => Some(StdRng::seed_from_u64(seed)),
            SimulationMode::Shots { seed: None, .. } => Some(StdRng::from_entropy()),
            SimulationMode::Exact => None,
        };
        Self {
            config,
            capabilities,
            mode,
            rng: Mutex::new(rng),
        }
    }

    /// The simulation mode.
    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// Evolve |0…0⟩ through every instruction and the global phase.
    fn evolve(circuit: &Circuit) -> Statevector {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut applied = 0usize;
        for inst in circuit.instructions() {
            sv.apply(inst);
            applied += 1;
        }
        sv.apply_global_phase(circuit.global_phase());
        debug!("Applied {} instructions", applied);
        sv
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit) -> ExecutionResult {
        let start = Instant::now();
        let num_qubits = circuit.num_qubits();
        debug!("Starting simulation: {} qubits, mode {:?}", num_qubits, self.mode);

        let sv = Self::evolve(circuit);

        let result = match self.mode {
            SimulationMode::Exact => {
                let probabilities = sv.probabilities();
                ExecutionResult::exact(probabilities).with_amplitudes(sv.into_amplitudes())
            }
            SimulationMode::Shots { shots, .. } => {
                let mut guard = self
                    .rng
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                let rng = guard.get_or_insert_with(StdRng::from_entropy);
                let histogram = sv.sample_histogram(rng, shots);
                drop(guard);

                #[allow(clippy::cast_possible_truncation)]
                let width = num_qubits as u32;
                let mut counts = Counts::new();
                for (index, &count) in histogram.iter().enumerate() {
                    if count > 0 {
                        counts.insert(index_to_bitstring(index, width), count);
                    }
                }
                ExecutionResult::sampled(counts, width, shots)
            }
        };

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = elapsed.as_millis() as u64;
        result.with_execution_time(elapsed_ms)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, circuit))]
    async fn execute(&self, circuit: &Circuit) -> HalResult<ExecutionResult> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        if circuit.num_qubits() == 0 {
            return Err(HalError::InvalidCircuit("circuit has no qubits".into()));
        }

        Ok(self.run_simulation(circuit))
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognised `extra` keys: `max_qubits`, `shots`, `seed`. A `shots`
    /// entry selects sampling mode.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits") {
            Some(v) => u32::try_from(v)
                .map_err(|_| HalError::Configuration(format!("max_qubits out of range: {v}")))?,
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.extra_u64("seed");
        let mode = match config.extra_u64("shots") {
            Some(0) => return Err(HalError::InvalidShots("shots must be positive".into())),
            Some(v) => SimulationMode::Shots {
                shots: u32::try_from(v)
                    .map_err(|_| HalError::InvalidShots(format!("shots out of range: {v}")))?,
                seed,
            },
            None => SimulationMode::Exact,
        };

        Ok(Self::build(config, max_qubits, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motifqu_ir::QubitId;

    fn superposition(n: u32) -> Circuit {
        let mut circuit = Circuit::with_size("uniform", n);
        circuit.h_all().unwrap();
        circuit
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert_eq!(caps.name, "statevector");
        assert!(backend.availability().await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_exact_uniform_distribution() {
        let backend = SimulatorBackend::new();
        let result = backend.execute(&superposition(3)).await.unwrap();

        assert!(result.is_exact());
        assert_eq!(result.probabilities.len(), 8);
        for p in &result.probabilities {
            assert!((p - 0.125).abs() < 1e-12);
        }
        assert_eq!(result.amplitudes.map(|a| a.len()), Some(8));
    }

    #[tokio::test]
    async fn test_exact_applies_global_phase() {
        let backend = SimulatorBackend::new();
        let mut circuit = Circuit::with_size("phase", 1);
        circuit.add_global_phase(std::f64::consts::PI);

        let result = backend.execute(&circuit).await.unwrap();
        let amps = result.amplitudes.unwrap();
        assert!((amps[0].re + 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_sampling_counts_use_qubit_zero_first_bitstrings() {
        let backend = SimulatorBackend::sampling(200, Some(1)).unwrap();
        let mut circuit = Circuit::with_size("x1", 3);
        circuit.x(QubitId(1)).unwrap();

        let result = backend.execute(&circuit).await.unwrap();
        let counts = result.counts.as_ref().unwrap();
        assert_eq!(counts.get("010"), 200);
        assert_eq!(result.shots, Some(200));
        assert!((result.probabilities[2] - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_seeded_sampling_is_reproducible() {
        let a = SimulatorBackend::sampling(500, Some(99)).unwrap();
        let b = SimulatorBackend::sampling(500, Some(99)).unwrap();
        let circuit = superposition(2);

        let ra = a.execute(&circuit).await.unwrap();
        let rb = b.execute(&circuit).await.unwrap();
        assert_eq!(ra.probabilities, rb.probabilities);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);
        let circuit = Circuit::with_size("test", 10);
        let result = backend.execute(&circuit).await;

        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("sampler")
            .with_extra("max_qubits", serde_json::json!(8))
            .with_extra("shots", serde_json::json!(64))
            .with_extra("seed", serde_json::json!(3));
        let backend = SimulatorBackend::from_config(config).unwrap();

        assert_eq!(backend.capabilities().num_qubits, 8);
        assert_eq!(
            backend.mode(),
            SimulationMode::Shots {
                shots: 64,
                seed: Some(3)
            }
        );

        let zero = BackendConfig::new("sampler").with_extra("shots", serde_json::json!(0));
        assert!(matches!(
            SimulatorBackend::from_config(zero),
            Err(HalError::InvalidShots(_))
        ));
    }
}
