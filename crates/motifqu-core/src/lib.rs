//! MotifQu core: amplitude amplification over genomic search spaces.
//!
//! A run maps a classical question, "which windows or k-mers satisfy this
//! predicate", onto a Grover circuit and decodes the result back into
//! ranked genomic hits:
//!
//! ```text
//!   Genome ──→ MarkingClassifier ──→ MarkedSet ──→ PhaseOracle ─┐
//!                   │                                           ├─→ AmplificationEngine ──→ ResultDecoder ──→ HitRecord
//!              BasisEncoder            IterationScheduler ──────┘         (Backend)
//! ```
//!
//! The predicate is evaluated classically and frozen into the oracle as a
//! fixed marked set; amplification speeds up finding the already-classified
//! candidates, not the classification itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use motifqu_adapter_sim::SimulatorBackend;
//! use motifqu_core::{Genome, RunOptions, SearchParams, run_search};
//!
//! # async fn demo() -> motifqu_core::MotifResult<()> {
//! let genome = Genome::new("chr1", "ATATATGGGCATATG")?;
//! let params = SearchParams::new("ATAT", 0)?;
//! let backend = SimulatorBackend::new();
//!
//! let report = run_search(&genome, &params, &backend, &RunOptions::default()).await?;
//! for hit in &report.hits {
//!     println!("{}:{}-{} p={:.3}", hit.contig, hit.start_1based, hit.end_1based, hit.probability);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod diffuser;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod iupac;
pub mod nucleotide;
pub mod oracle;
pub mod pipeline;
pub mod schedule;

pub use classifier::{
    Classified, ClassicalScore, Genome, HammingClassifier, KmerCountClassifier, KmerTally,
    Location, MarkedSet, MarkingClassifier, Strand, WindowScan, merge_reverse_complements,
};
pub use config::MotifConfig;
pub use decoder::{HitRecord, ResultDecoder, TopKPolicy};
pub use diffuser::Diffuser;
pub use encoder::{BasisEncoder, EncodedIndex, KmerEncoder, SearchSpace, Window, WindowEncoder};
pub use engine::{
    Amplification, AmplificationEngine, AmplificationOutcome, AmplitudeState, assemble_circuit,
};
pub use error::{MotifError, MotifResult};
pub use iupac::{KNOWN_MOTIFS, KnownMotif, expand_iupac, find_motif};
pub use oracle::{MarkedGateSequence, Operator, OracleSpec, PhaseOracle};
pub use pipeline::{
    DiscoveryParams, Mode, RunOptions, RunReport, RunSummary, SearchParams, run_discovery,
    run_search,
};
pub use schedule::{
    IterationScheduler, Schedule, marginal_success_probability, optimal_iterations,
    success_probability,
};
