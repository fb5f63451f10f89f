//! Discover command implementation.

use anyhow::Result;
use console::style;

use motifqu_core::{DiscoveryParams, RunOptions, run_discovery};

use super::common::{RunArgs, create_backend, load_config, load_genome, print_report, spinner};

/// Execute the discover command.
pub async fn execute(k: i64, min_count: i64, merge_revcomp: bool, args: RunArgs) -> Result<()> {
    let params = DiscoveryParams::new(k, min_count, merge_revcomp)?;
    let config = load_config(&args)?;
    let genome = load_genome(&args.fasta)?;

    if !args.json {
        println!(
            "{} Discovering {}-mers seen ≥{} times in {}{} on {}",
            style("→").cyan().bold(),
            params.k(),
            params.min_count(),
            style(genome.contig()).green(),
            if params.merge_revcomp() {
                " (strands merged)"
            } else {
                ""
            },
            style(&config.backend.name).yellow()
        );
    }

    let backend = create_backend(&config)?;
    let options = RunOptions::from_config(&config);

    let progress = spinner("Amplifying...", args.json)?;
    let report = run_discovery(&genome, &params, backend.as_ref(), &options).await;
    progress.finish_and_clear();

    print_report(&report?, args.json)
}
