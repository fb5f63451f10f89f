//! Amplification engine.
//!
//! Prepares the uniform superposition, applies `r` rounds of oracle then
//! diffuser, and hands the circuit to a [`Backend`]. The engine never looks
//! at which backend it drives: it only needs the execute capability and the
//! backend's qubit count.

use motifqu_hal::{Backend, HalError, ValidationResult};
use motifqu_ir::{Circuit, CircuitStats};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::classifier::MarkedSet;
use crate::diffuser::Diffuser;
use crate::error::{MotifError, MotifResult};
use crate::oracle::{Operator, OracleSpec, PhaseOracle};
use crate::schedule::{
    IterationScheduler, Schedule, marginal_success_probability, success_probability,
};

/// Widest register the engine will extend to.
const MAX_REGISTER_QUBITS: u32 = 62;

/// Margin the planned marked mass must clear over the uniform baseline.
const GAIN_TOLERANCE: f64 = 1e-9;

/// How an amplification run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplificationOutcome {
    /// Oracle and diffuser were applied.
    Amplified,
    /// Nothing was marked; the uniform distribution is returned.
    NoHits,
    /// Every reachable state was marked; the uniform distribution is returned.
    AllCandidatesMatch,
    /// No register within the qubit ceiling lets the scheduled rounds raise
    /// the marked mass; the uniform distribution is returned.
    MarkedMajority,
}

impl std::fmt::Display for AmplificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AmplificationOutcome::Amplified => "amplified",
            AmplificationOutcome::NoHits => "no hits",
            AmplificationOutcome::AllCandidatesMatch => "all candidates match",
            AmplificationOutcome::MarkedMajority => "marked majority",
        })
    }
}

/// Final distribution over basis states, indexed by encoded index.
#[derive(Debug, Clone)]
pub struct AmplitudeState {
    probabilities: Vec<f64>,
    amplitudes: Option<Vec<Complex64>>,
    exact: bool,
}

impl AmplitudeState {
    /// The uniform superposition over `2^n` states.
    pub fn uniform(num_qubits: u32) -> Self {
        let size = 1usize << num_qubits;
        let p = 1.0 / size as f64;
        Self {
            probabilities: vec![p; size],
            amplitudes: Some(vec![Complex64::new(p.sqrt(), 0.0); size]),
            exact: true,
        }
    }

    /// Number of basis states.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Whether the state is empty. Never true for an engine result.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability of `index`, zero outside the register.
    pub fn probability(&self, index: u64) -> f64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.probabilities.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    /// All probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Amplitudes, when the backend reported them.
    pub fn amplitudes(&self) -> Option<&[Complex64]> {
        self.amplitudes.as_deref()
    }

    /// Whether the distribution is exact rather than sampled.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Trace out every qubit above the low `num_qubits`.
    fn marginalize(self, num_qubits: u32) -> Self {
        let size = 1usize << num_qubits;
        if self.probabilities.len() <= size {
            return self;
        }
        let mut probabilities = vec![0.0; size];
        for (i, p) in self.probabilities.iter().enumerate() {
            probabilities[i & (size - 1)] += p;
        }
        Self {
            probabilities,
            amplitudes: None,
            exact: self.exact,
        }
    }

    /// Total probability on the marked set.
    pub fn marked_mass(&self, marked: &MarkedSet) -> f64 {
        marked.iter().map(|&i| self.probability(i)).sum()
    }
}

/// Everything one engine run produces.
#[derive(Debug, Clone)]
pub struct Amplification {
    /// Final distribution.
    pub state: AmplitudeState,
    /// How the run ended.
    pub outcome: AmplificationOutcome,
    /// Rounds applied; `None` when amplification was skipped.
    pub schedule: Option<Schedule>,
    /// Statistics of the executed circuit.
    pub circuit_stats: Option<CircuitStats>,
    /// Backend that executed the circuit.
    pub backend: String,
    /// Backend-reported execution time.
    pub execution_time_ms: Option<u64>,
    /// Extra high qubits the circuit ran with; traced out of `state`.
    pub ancilla_qubits: u32,
    /// Marked mass the applied rounds should leave on `state`.
    pub expected_marked_mass: f64,
}

impl Amplification {
    /// Rounds applied, zero when skipped.
    pub fn iterations(&self) -> u32 {
        self.schedule.map_or(0, |s| s.iterations)
    }
}

/// Uniform superposition followed by `iterations` rounds of oracle and
/// diffuser, separated by barriers.
pub fn assemble_circuit(
    oracle: &PhaseOracle,
    iterations: u32,
    progress_every: u32,
) -> MotifResult<Circuit> {
    let n = oracle.num_qubits();
    let diffuser = Diffuser::new(n);
    let mut circuit = Circuit::with_size("motifqu_grover", n);

    circuit.h_all()?;
    circuit.barrier_all()?;
    for round in 1..=iterations {
        oracle.append_to(&mut circuit)?;
        diffuser.append_to(&mut circuit)?;
        circuit.barrier_all()?;
        if progress_every > 0 && (round % progress_every == 0 || round == iterations) {
            debug!("Assembled Grover round {}/{}", round, iterations);
        }
    }
    Ok(circuit)
}

/// Register and round count picked for one run.
#[derive(Debug, Clone, Copy)]
struct Plan {
    num_qubits: u32,
    schedule: Schedule,
    expected_marked_mass: f64,
}

/// Runs amplitude amplification on a backend.
///
/// When so much of the space is marked that the scheduled rounds would not
/// raise the marked mass, the engine adds unmarked high qubits until they do
/// and traces them out of the returned state. Forced round counts always run
/// on the natural register.
pub struct AmplificationEngine<'b> {
    backend: &'b dyn Backend,
    progress_every: u32,
    qubit_ceiling: Option<u32>,
}

impl<'b> AmplificationEngine<'b> {
    /// Engine driving `backend`.
    pub fn new(backend: &'b dyn Backend) -> Self {
        Self {
            backend,
            progress_every: 5,
            qubit_ceiling: None,
        }
    }

    /// Cap the register below the backend's own limit.
    #[must_use]
    pub fn with_qubit_ceiling(mut self, ceiling: u32) -> Self {
        self.qubit_ceiling = Some(ceiling);
        self
    }

    /// The tighter of the configured and backend qubit limits.
    pub fn qubit_ceiling(&self) -> u32 {
        let backend = self.backend.capabilities().num_qubits;
        self.qubit_ceiling.map_or(backend, |c| c.min(backend))
    }

    /// Log progress every `rounds` rounds; 0 disables it.
    #[must_use]
    pub fn with_progress_every(mut self, rounds: u32) -> Self {
        self.progress_every = rounds;
        self
    }

    /// The backend's name.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Amplify the marked states of `spec`.
    #[instrument(skip_all, fields(qubits = spec.num_qubits(), marked = spec.marked().len()))]
    pub async fn amplify(
        &self,
        spec: &OracleSpec,
        scheduler: &IterationScheduler,
    ) -> MotifResult<Amplification> {
        let n = spec.num_qubits();
        let ceiling = self.qubit_ceiling();
        if n > ceiling {
            return Err(MotifError::QubitCeilingExceeded {
                requested: n,
                ceiling,
            });
        }

        let size = spec.size();
        let marked = spec.marked().len() as u64;
        if marked == 0 {
            info!("Skipping amplification: {}", AmplificationOutcome::NoHits);
            return Ok(self.skipped(spec, AmplificationOutcome::NoHits));
        }
        if marked >= spec.reachable() {
            info!(
                "Skipping amplification: {}",
                AmplificationOutcome::AllCandidatesMatch
            );
            return Ok(self.skipped(spec, AmplificationOutcome::AllCandidatesMatch));
        }

        let Some(plan) = plan(n, marked, scheduler, ceiling)? else {
            info!(
                "Skipping amplification: {} ({} of {} states marked, ceiling {} qubits)",
                AmplificationOutcome::MarkedMajority,
                marked,
                size,
                ceiling
            );
            return Ok(self.skipped(spec, AmplificationOutcome::MarkedMajority));
        };
        let schedule = plan.schedule;
        if schedule.forced {
            info!(
                "Using forced iteration count {} (optimal {})",
                schedule.iterations, schedule.optimal
            );
        } else {
            info!("Using optimal iteration count {}", schedule.iterations);
        }
        let ancilla_qubits = plan.num_qubits - n;
        if ancilla_qubits > 0 {
            info!(
                "Extending register by {} unmarked qubit(s) to {}",
                ancilla_qubits, plan.num_qubits
            );
        }

        let register = OracleSpec::new(spec.marked().clone(), plan.num_qubits)?;
        let oracle = PhaseOracle::build(&register);
        let circuit = assemble_circuit(&oracle, schedule.iterations, self.progress_every)?;
        let stats = circuit.stats();
        info!(
            "Circuit: {} gates, depth {}, {} oracle records",
            stats.gate_count,
            stats.depth,
            oracle.records().len()
        );

        if let ValidationResult::Invalid { reasons } = self.backend.validate(&circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")).into());
        }

        let result = self.backend.execute(&circuit).await?;
        let executed = register.size();
        let expected = usize::try_from(executed).unwrap_or(usize::MAX);
        if result.probabilities.len() != expected {
            return Err(HalError::DistributionLength {
                expected: executed,
                got: result.probabilities.len(),
            }
            .into());
        }

        let exact = result.is_exact();
        let state = AmplitudeState {
            probabilities: result.probabilities,
            amplitudes: result.amplitudes,
            exact,
        }
        .marginalize(n);
        debug!(
            "Marked probability mass {:.6} (expected {:.6})",
            state.marked_mass(spec.marked()),
            plan.expected_marked_mass
        );

        Ok(Amplification {
            state,
            outcome: AmplificationOutcome::Amplified,
            schedule: Some(schedule),
            circuit_stats: Some(stats),
            backend: self.backend.name().to_string(),
            execution_time_ms: result.execution_time_ms,
            ancilla_qubits,
            expected_marked_mass: plan.expected_marked_mass,
        })
    }

    fn skipped(&self, spec: &OracleSpec, outcome: AmplificationOutcome) -> Amplification {
        Amplification {
            state: AmplitudeState::uniform(spec.num_qubits()),
            outcome,
            schedule: None,
            circuit_stats: None,
            backend: self.backend.name().to_string(),
            execution_time_ms: None,
            ancilla_qubits: 0,
            expected_marked_mass: spec.marked().len() as f64 / spec.size() as f64,
        }
    }
}

/// Pick the narrowest register, from `n` qubits up to `ceiling`, on which
/// the optimal round count beats the uniform marked mass `M / 2^n`.
fn plan(
    n: u32,
    marked: u64,
    scheduler: &IterationScheduler,
    ceiling: u32,
) -> MotifResult<Option<Plan>> {
    let size = 1u64 << n;
    if scheduler.override_iterations().is_some() {
        let schedule = scheduler.schedule(size, marked)?;
        return Ok(Some(Plan {
            num_qubits: n,
            schedule,
            expected_marked_mass: success_probability(size, marked, schedule.iterations),
        }));
    }

    let baseline = marked as f64 / size as f64;
    for num_qubits in n..=ceiling.min(MAX_REGISTER_QUBITS) {
        let extended = 1u64 << num_qubits;
        let schedule = scheduler.schedule(extended, marked)?;
        let mass = marginal_success_probability(size, extended, marked, schedule.iterations);
        if mass > baseline + GAIN_TOLERANCE {
            return Ok(Some(Plan {
                num_qubits,
                schedule,
                expected_marked_mass: mass,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::SearchSpace;

    #[test]
    fn test_uniform_state() {
        let state = AmplitudeState::uniform(4);
        assert_eq!(state.len(), 16);
        assert!(state.is_exact());
        assert!((state.probability(3) - 0.0625).abs() < 1e-12);
        assert_eq!(state.probability(16), 0.0);
        let amps = state.amplitudes().unwrap();
        assert!((amps[0].re - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_assemble_circuit_layout() {
        let space = SearchSpace::for_windows(16, 20).unwrap();
        let spec = OracleSpec::new(MarkedSet::new(&space, [5]).unwrap(), 4).unwrap();
        let oracle = PhaseOracle::build(&spec);
        let circuit = assemble_circuit(&oracle, 2, 1).unwrap();
        let stats = circuit.stats();

        // Initial H layer plus H-all twice per diffuser.
        assert_eq!(stats.count("h"), 4 + 2 * 8);
        // One oracle MCZ and one diffuser MCZ per round.
        assert_eq!(stats.count("mcz"), 4);
        let barriers = circuit.instructions().filter(|i| i.is_barrier()).count();
        assert_eq!(barriers, 3);
        assert!((circuit.global_phase() - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_plan_extends_majority_marked_register() {
        let scheduler = IterationScheduler::new();

        let p = plan(4, 1, &scheduler, 20).unwrap().unwrap();
        assert_eq!(p.num_qubits, 4);
        assert_eq!(p.schedule.iterations, 3);

        // 11 of 16: one round on 4 qubits leaves ~0.04 on the marked set.
        let p = plan(4, 11, &scheduler, 20).unwrap().unwrap();
        assert_eq!(p.num_qubits, 5);
        assert_eq!(p.schedule.iterations, 1);
        assert!(p.expected_marked_mass > 0.95);

        // Half marked needs two extra qubits.
        let p = plan(4, 8, &scheduler, 20).unwrap().unwrap();
        assert_eq!(p.num_qubits, 6);

        assert!(plan(4, 11, &scheduler, 4).unwrap().is_none());
    }

    #[test]
    fn test_plan_forced_keeps_register() {
        let p = plan(4, 11, &IterationScheduler::forced(2), 20)
            .unwrap()
            .unwrap();
        assert_eq!(p.num_qubits, 4);
        assert_eq!(p.schedule.iterations, 2);
    }

    #[test]
    fn test_marginalize_folds_high_qubits() {
        let state = AmplitudeState {
            probabilities: vec![0.1, 0.2, 0.3, 0.4],
            amplitudes: None,
            exact: true,
        }
        .marginalize(1);
        assert_eq!(state.len(), 2);
        assert!((state.probability(0) - 0.4).abs() < 1e-12);
        assert!((state.probability(1) - 0.6).abs() < 1e-12);
    }
}
