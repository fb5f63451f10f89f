//! Motif catalog and IUPAC expansion commands.

use anyhow::Result;
use console::style;

use motifqu_core::{KNOWN_MOTIFS, expand_iupac, find_motif};

/// Execute the list-motifs command.
pub fn list() {
    println!("{} Known motifs:\n", style("MotifQu").cyan().bold());
    for motif in KNOWN_MOTIFS {
        println!(
            "  {:<16} {:<12} {}",
            style(motif.name).bold(),
            style(motif.consensus).cyan(),
            style(motif.description).dim()
        );
    }
}

/// Resolve a catalog name to its consensus; anything else is a raw pattern.
pub fn resolve_pattern(pattern: &str) -> &str {
    find_motif(pattern).map_or(pattern, |m| m.consensus)
}

/// Execute the expand command.
pub fn expand(pattern: &str, limit: usize) -> Result<()> {
    let consensus = resolve_pattern(pattern);
    let sequences = expand_iupac(consensus, limit)?;

    eprintln!(
        "{} {} expands to {} sequence(s)",
        style("→").cyan().bold(),
        style(consensus).cyan(),
        sequences.len()
    );
    for seq in &sequences {
        println!("{seq}");
    }
    Ok(())
}
