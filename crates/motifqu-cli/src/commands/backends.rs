//! Backends command implementation.

use anyhow::Result;
use console::style;

use motifqu_core::MotifConfig;

use super::common::registry;

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("MotifQu").cyan().bold());

    let registry = registry();
    let defaults = MotifConfig::default();

    for name in registry.available_backends() {
        let mut config = defaults.clone();
        config.backend.name.clone_from(&name);
        let backend = registry.create(&name, config.backend_config())?;
        let caps = backend.capabilities();
        let available = backend.availability().await?.is_available;

        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold(),
            if caps.is_simulator { "(local)" } else { "" }
        );
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Max shots: {}", caps.max_shots);
        let gates: Vec<&str> = caps.gate_set.names().collect();
        println!("    Gates: {}", gates.join(", "));
        println!();
    }

    Ok(())
}
