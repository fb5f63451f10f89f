//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Grover amplitude amplification for genomic motif search",
        style("MotifQu").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  motifqu-ir           Circuit intermediate representation");
    println!("  motifqu-hal          Backend abstraction layer");
    println!("  motifqu-adapter-sim  Statevector simulator");
    println!("  motifqu-core         Encoding, oracle, scheduling and decoding");
    println!("  motifqu-cli          Command-line interface");
    println!();
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
