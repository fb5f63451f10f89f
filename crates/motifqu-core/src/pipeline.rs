//! End-to-end runs: classify, build the oracle, schedule, amplify, decode.

use std::time::Instant;

use motifqu_hal::Backend;
use motifqu_ir::CircuitStats;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::classifier::{
    Classified, Genome, HammingClassifier, KmerCountClassifier, MarkingClassifier,
};
use crate::config::MotifConfig;
use crate::decoder::{HitRecord, ResultDecoder, TopKPolicy};
use crate::engine::{AmplificationEngine, AmplificationOutcome};
use crate::error::{MotifError, MotifResult};
use crate::nucleotide;
use crate::oracle::OracleSpec;
use crate::schedule::IterationScheduler;

/// Which marking predicate a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Windows within a Hamming distance of a query motif.
    Search,
    /// K-mers occurring at least `min_count` times.
    Discovery,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::Search => "search",
            Mode::Discovery => "discovery",
        })
    }
}

/// Validated search-mode parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    motif: String,
    max_mismatches: u32,
}

impl SearchParams {
    /// Validate a motif and a mismatch tolerance.
    pub fn new(motif: &str, mismatches: i64) -> MotifResult<Self> {
        let motif = nucleotide::normalize(motif);
        if motif.is_empty() {
            return Err(MotifError::InvalidParameter("motif is empty".into()));
        }
        nucleotide::validate_acgt(&motif, "query motif")?;
        let max_mismatches = u32::try_from(mismatches).map_err(|_| {
            MotifError::InvalidParameter(format!("mismatches must be >= 0, got {mismatches}"))
        })?;
        Ok(Self {
            motif,
            max_mismatches,
        })
    }

    /// Upper-case motif.
    pub fn motif(&self) -> &str {
        &self.motif
    }

    /// Mismatch tolerance.
    pub fn max_mismatches(&self) -> u32 {
        self.max_mismatches
    }
}

/// Validated discovery-mode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryParams {
    k: usize,
    min_count: u64,
    merge_revcomp: bool,
}

impl DiscoveryParams {
    /// Validate k-mer length and count threshold.
    pub fn new(k: i64, min_count: i64, merge_revcomp: bool) -> MotifResult<Self> {
        let k = usize::try_from(k)
            .ok()
            .filter(|&k| k > 0)
            .ok_or_else(|| MotifError::InvalidParameter(format!("k must be positive, got {k}")))?;
        let min_count = u64::try_from(min_count)
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                MotifError::InvalidParameter(format!("min_count must be >= 1, got {min_count}"))
            })?;
        Ok(Self {
            k,
            min_count,
            merge_revcomp,
        })
    }

    /// K-mer length.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Count threshold.
    pub fn min_count(&self) -> u64 {
        self.min_count
    }

    /// Whether reverse complements are merged.
    pub fn merge_revcomp(&self) -> bool {
        self.merge_revcomp
    }
}

/// Knobs shared by both modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Largest register allowed.
    pub qubit_ceiling: u32,
    /// Round-count policy.
    pub scheduler: IterationScheduler,
    /// Progress logging interval in rounds.
    pub progress_every: u32,
    /// Which states to report.
    pub policy: TopKPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&MotifConfig::default())
    }
}

impl RunOptions {
    /// Options described by a loaded configuration.
    pub fn from_config(config: &MotifConfig) -> Self {
        Self {
            qubit_ceiling: config.engine.qubit_ceiling,
            scheduler: IterationScheduler::with_override(config.engine.force_iterations),
            progress_every: config.engine.progress_every,
            policy: config.top_k_policy(),
        }
    }
}

/// Diagnostics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Marking predicate used.
    pub mode: Mode,
    /// Contig name.
    pub contig: String,
    /// Contig length.
    pub sequence_length: usize,
    /// `N = 2^n`.
    pub search_space_size: u64,
    /// `n`.
    pub num_qubits: u32,
    /// Indices that map to a genomic object.
    pub reachable_states: u64,
    /// `|M|`.
    pub marked_count: usize,
    /// Rounds applied.
    pub iterations: u32,
    /// Rounds the formula asked for, absent when amplification was skipped.
    pub optimal_iterations: Option<u32>,
    /// Whether the round count was overridden.
    pub iterations_forced: bool,
    /// Unmarked qubits added above the register to keep amplification
    /// effective.
    pub ancilla_qubits: u32,
    /// How amplification ended.
    pub outcome: AmplificationOutcome,
    /// Backend name.
    pub backend: String,
    /// Whether the distribution is exact.
    pub exact: bool,
    /// Executed circuit statistics.
    pub circuit: Option<CircuitStats>,
    /// Measured probability on the marked set.
    pub marked_probability_mass: f64,
    /// Expected marked mass for the applied rounds: `sin²((2r+1)θ)`, with
    /// any extra qubits traced out.
    pub theoretical_success: f64,
    /// Wall time of the whole run.
    pub elapsed_ms: u64,
}

/// Summary plus ranked hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run diagnostics.
    pub summary: RunSummary,
    /// Ranked hits.
    pub hits: Vec<HitRecord>,
}

/// Search `genome` for windows close to a motif.
#[instrument(skip_all, fields(contig = genome.contig(), motif = params.motif()))]
pub async fn run_search(
    genome: &Genome,
    params: &SearchParams,
    backend: &dyn Backend,
    options: &RunOptions,
) -> MotifResult<RunReport> {
    let classifier = HammingClassifier::new(
        params.motif(),
        params.max_mismatches(),
        effective_ceiling(backend, options),
    )?;
    run(Mode::Search, genome, &classifier, backend, options).await
}

/// Discover frequent k-mers in `genome`.
#[instrument(skip_all, fields(contig = genome.contig(), k = params.k()))]
pub async fn run_discovery(
    genome: &Genome,
    params: &DiscoveryParams,
    backend: &dyn Backend,
    options: &RunOptions,
) -> MotifResult<RunReport> {
    let classifier = KmerCountClassifier::new(
        params.k(),
        params.min_count(),
        params.merge_revcomp(),
        effective_ceiling(backend, options),
    )?;
    run(Mode::Discovery, genome, &classifier, backend, options).await
}

fn effective_ceiling(backend: &dyn Backend, options: &RunOptions) -> u32 {
    options
        .qubit_ceiling
        .min(backend.capabilities().num_qubits)
}

async fn run<C: MarkingClassifier>(
    mode: Mode,
    genome: &Genome,
    classifier: &C,
    backend: &dyn Backend,
    options: &RunOptions,
) -> MotifResult<RunReport> {
    let start = Instant::now();
    info!("Loaded contig={} length={}", genome.contig(), genome.len());

    let classified = classifier.classify(genome)?;
    let space = classified.space();
    info!(
        "Marked {} states; qubits n={}, padded N={}, real positions={}",
        classified.marked().len(),
        space.num_qubits(),
        space.size(),
        space.reachable()
    );

    let spec = OracleSpec::new(classified.marked().clone(), space.num_qubits())?
        .with_reachable(space.reachable())?;
    let engine = AmplificationEngine::new(backend)
        .with_progress_every(options.progress_every)
        .with_qubit_ceiling(effective_ceiling(backend, options));
    let amplification = engine.amplify(&spec, &options.scheduler).await?;

    let hits = ResultDecoder::new(options.policy).decode(&amplification.state, &classified);
    let marked_mass = amplification.state.marked_mass(classified.marked());
    info!(
        "Outcome {}: {} hits reported, marked mass {:.4}",
        amplification.outcome,
        hits.len(),
        marked_mass
    );

    let iterations = amplification.iterations();
    #[allow(clippy::cast_possible_truncation)]
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let summary = RunSummary {
        mode,
        contig: genome.contig().to_string(),
        sequence_length: genome.len(),
        search_space_size: space.size(),
        num_qubits: space.num_qubits(),
        reachable_states: space.reachable(),
        marked_count: classified.marked().len(),
        iterations,
        optimal_iterations: amplification.schedule.map(|s| s.optimal),
        iterations_forced: amplification.schedule.is_some_and(|s| s.forced),
        outcome: amplification.outcome,
        backend: amplification.backend,
        exact: amplification.state.is_exact(),
        circuit: amplification.circuit_stats,
        marked_probability_mass: marked_mass,
        ancilla_qubits: amplification.ancilla_qubits,
        theoretical_success: amplification.expected_marked_mass,
        elapsed_ms,
    };

    Ok(RunReport { summary, hits })
}
