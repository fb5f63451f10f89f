//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use motifqu_adapter_sim::SimulatorBackend;
use motifqu_core::{Genome, MotifConfig, RunReport};
use motifqu_hal::{Backend, BackendFactory, BackendRegistry};

/// Arguments shared by `search` and `discover` after clap parsing.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub fasta: PathBuf,
    pub top_k: Option<usize>,
    pub iterations: Option<u32>,
    pub progress_every: Option<u32>,
    pub backend: Option<String>,
    pub shots: Option<u32>,
    pub seed: Option<u64>,
    pub max_qubits: Option<u32>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Parse FASTA text, keeping the first record.
///
/// The contig name is the first word of the header; text without a header
/// is treated as a bare sequence named `default_name`.
pub fn parse_fasta(text: &str, default_name: &str) -> Result<(String, String)> {
    let mut name: Option<String> = None;
    let mut sequence = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if name.is_some() || !sequence.is_empty() {
                break;
            }
            let id = header.split_whitespace().next().unwrap_or(default_name);
            name = Some(id.to_string());
            continue;
        }
        sequence.push_str(line);
    }

    if sequence.is_empty() {
        anyhow::bail!("FASTA input contains no sequence");
    }
    Ok((name.unwrap_or_else(|| default_name.to_string()), sequence))
}

/// Load the first record of a FASTA file as a [`Genome`].
pub fn load_genome(path: &Path) -> Result<Genome> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sequence");
    let (contig, sequence) = parse_fasta(&text, stem)?;
    Genome::new(contig, &sequence).with_context(|| format!("Invalid FASTA: {}", path.display()))
}

/// Load configuration and apply command-line overrides on top.
pub fn load_config(args: &RunArgs) -> Result<MotifConfig> {
    let mut config = MotifConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Apply flags that were given on the command line.
pub fn apply_overrides(config: &mut MotifConfig, args: &RunArgs) {
    if let Some(k) = args.top_k {
        config.decoder.top_k = Some(k);
    }
    if let Some(r) = args.iterations {
        config.engine.force_iterations = Some(r);
    }
    if let Some(every) = args.progress_every {
        config.engine.progress_every = every;
    }
    if let Some(ceiling) = args.max_qubits {
        config.engine.qubit_ceiling = ceiling;
    }
    if let Some(name) = &args.backend {
        config.backend.name.clone_from(name);
    }
    if let Some(shots) = args.shots {
        config.backend.shots = shots;
    }
    if let Some(seed) = args.seed {
        config.backend.seed = Some(seed);
    }
}

/// Registry of the backends this binary ships with.
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    // Exact mode: drop the sampling keys so the simulator reports amplitudes.
    registry.register_factory("statevector", |mut config| {
        config.extra.remove("shots");
        config.extra.remove("seed");
        let backend = SimulatorBackend::from_config(config)?;
        Ok(Box::new(backend) as Box<dyn Backend>)
    });
    registry.register::<SimulatorBackend>("sampler");
    registry
}

/// Instantiate the configured backend.
pub fn create_backend(config: &MotifConfig) -> Result<Box<dyn Backend>> {
    let registry = registry();
    let name = config.backend.name.as_str();
    if !registry.has_backend(name) {
        anyhow::bail!(
            "Unknown backend: '{name}'. Available: {}",
            registry.available_backends().join(", ")
        );
    }
    let backend = registry.create(name, config.backend_config())?;
    info!(
        "Backend {} ready ({} qubits)",
        backend.name(),
        backend.capabilities().num_qubits
    );
    Ok(backend)
}

/// Spinner shown while a run is in flight.
pub fn spinner(message: impl Into<String>, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Print a run report as a table or as JSON.
pub fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let s = &report.summary;
    println!(
        "\n{} {} on {} ({} bp)",
        style("✓").green().bold(),
        style(s.mode).cyan(),
        style(&s.contig).green(),
        s.sequence_length
    );
    println!(
        "  Qubits: {}  Search space: {} ({} real)  Marked: {}",
        s.num_qubits, s.search_space_size, s.reachable_states, s.marked_count
    );
    if s.ancilla_qubits > 0 {
        println!("  Extra qubits: {} (traced out)", s.ancilla_qubits);
    }
    match s.optimal_iterations {
        Some(optimal) if s.iterations_forced => println!(
            "  Iterations: {} (forced, optimal {})",
            style(s.iterations).yellow(),
            optimal
        ),
        _ => println!("  Iterations: {}", style(s.iterations).yellow()),
    }
    println!(
        "  Outcome: {}  Backend: {}{}",
        s.outcome,
        s.backend,
        if s.exact { " (exact)" } else { " (sampled)" }
    );
    if let Some(stats) = &s.circuit {
        let breakdown: Vec<String> = stats
            .gate_counts
            .iter()
            .map(|(gate, count)| format!("{gate}={count}"))
            .collect();
        println!(
            "  Circuit: {} gates, depth {} [{}]",
            stats.gate_count,
            stats.depth,
            breakdown.join(" ")
        );
    }
    println!(
        "  Marked probability: {:.4} (theory {:.4})",
        s.marked_probability_mass, s.theoretical_success
    );

    if report.hits.is_empty() {
        println!("\n  No hits.");
    } else {
        println!();
        for hit in &report.hits {
            let tag = if hit.marked {
                style("HIT").green().bold()
            } else {
                style("   ").dim()
            };
            println!(
                "  {:>3}. {} {}:{}-{} {} {} p={:.4} {}",
                hit.rank,
                tag,
                hit.contig,
                hit.start_1based,
                hit.end_1based,
                hit.strand,
                style(&hit.sequence).cyan(),
                hit.probability,
                hit.score
            );
        }
    }

    println!("\n  Elapsed: {} ms", style(s.elapsed_ms).yellow());
    Ok(())
}
