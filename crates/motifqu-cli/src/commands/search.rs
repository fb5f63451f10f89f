//! Search command implementation.

use anyhow::Result;
use console::style;

use motifqu_core::{RunOptions, SearchParams, run_search};

use super::common::{RunArgs, create_backend, load_config, load_genome, print_report, spinner};

/// Execute the search command.
pub async fn execute(motif: &str, mismatches: i64, args: RunArgs) -> Result<()> {
    let params = SearchParams::new(motif, mismatches)?;
    let config = load_config(&args)?;
    let genome = load_genome(&args.fasta)?;

    if !args.json {
        println!(
            "{} Searching {} for {} (≤{} mismatches) on {}",
            style("→").cyan().bold(),
            style(genome.contig()).green(),
            style(params.motif()).cyan(),
            params.max_mismatches(),
            style(&config.backend.name).yellow()
        );
    }

    let backend = create_backend(&config)?;
    let options = RunOptions::from_config(&config);

    let progress = spinner("Amplifying...", args.json)?;
    let report = run_search(&genome, &params, backend.as_ref(), &options).await;
    progress.finish_and_clear();

    print_report(&report?, args.json)
}
