//! MotifQu Command-Line Interface
//!
//! The main entry point for the `motifqu` tool: Grover amplitude
//! amplification over the windows or k-mers of a genome.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::RunArgs;
use commands::{backends, discover, motifs, search, version};

/// MotifQu - amplitude amplification for genomic motif search
#[derive(Parser)]
#[command(name = "motifqu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the amplification commands.
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// FASTA file with the genome (first record is used)
    #[arg(short, long)]
    fasta: PathBuf,

    /// Number of hits to report (default: every state above the uniform floor)
    #[arg(long)]
    topk: Option<usize>,

    /// Force the number of Grover iterations
    #[arg(long)]
    iters: Option<u32>,

    /// Log progress every N Grover rounds (0 disables)
    #[arg(long)]
    progress_every: Option<u32>,

    /// Execution backend (statevector, sampler)
    #[arg(short, long)]
    backend: Option<String>,

    /// Shots for the sampling backend
    #[arg(long)]
    shots: Option<u32>,

    /// Seed for the sampling backend
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum register size in qubits
    #[arg(long)]
    max_qubits: Option<u32>,

    /// YAML configuration file
    #[arg(short, long, env = "MOTIFQU_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl From<CommonArgs> for RunArgs {
    fn from(args: CommonArgs) -> Self {
        Self {
            fasta: args.fasta,
            top_k: args.topk,
            iterations: args.iters,
            progress_every: args.progress_every,
            backend: args.backend,
            shots: args.shots,
            seed: args.seed,
            max_qubits: args.max_qubits,
            config: args.config,
            json: args.json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a motif allowing up to N mismatches
    Search {
        /// Motif to search for (ACGT, case-insensitive)
        #[arg(short, long)]
        motif: String,

        /// Maximum Hamming distance
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        mismatches: i64,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Discover k-mers occurring at least N times
    Discover {
        /// K-mer length
        #[arg(short, long = "kmer-length", default_value = "6", allow_negative_numbers = true)]
        k: i64,

        /// Minimum occurrence count
        #[arg(long, default_value = "2", allow_negative_numbers = true)]
        min_count: i64,

        /// Count each strand separately instead of merging reverse complements
        #[arg(long)]
        no_revcomp: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List well-known regulatory and restriction motifs
    ListMotifs,

    /// Expand an IUPAC pattern into concrete ACGT sequences
    Expand {
        /// IUPAC pattern or catalog motif name
        pattern: String,

        /// Maximum number of expansions
        #[arg(long, default_value_t = motifqu_core::iupac::DEFAULT_EXPANSION_LIMIT)]
        limit: usize,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_env("MOTIFQU_LOG").unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Search {
            motif,
            mismatches,
            common,
        } => search::execute(&motif, mismatches, common.into()).await,

        Commands::Discover {
            k,
            min_count,
            no_revcomp,
            common,
        } => discover::execute(k, min_count, !no_revcomp, common.into()).await,

        Commands::ListMotifs => {
            motifs::list();
            Ok(())
        }

        Commands::Expand { pattern, limit } => motifs::expand(&pattern, limit),

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
