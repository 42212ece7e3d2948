//! Simple simulation example: load a board snapshot, run one cycle and print
//! the state of every component.

use wireboard::prelude::*;
use std::path::Path;

fn main() -> Result<(), WireboardError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/lamp_circuit.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_simulation [path/to/board.json]");
        std::process::exit(1);
    }

    let core = WireboardCore::new(SimulationOptions::default());
    let summary = core.simulate_file(path)?;

    println!("Simulation results for: {}", path.display());
    println!("Status: {:?} after {} passes", summary.report.status, summary.report.passes);
    println!("Electrical nodes: {}", summary.report.node_count);
    println!();

    for component in &summary.components {
        println!("{} ({})", component.id, component.type_id);
        for property in component.properties.iter().filter(|p| p.displayable) {
            println!("  {} = {}", property.name, property.value);
        }
    }

    if !summary.report.floating_inputs.is_empty() {
        println!("\nInputs left floating:");
        for input in &summary.report.floating_inputs {
            println!("  - {} terminal {}", input.component, input.terminal);
        }
    }

    if !summary.is_stable() {
        println!("\nBoard did not settle (oscillating feedback?).");
        std::process::exit(2);
    }
    Ok(())
}
