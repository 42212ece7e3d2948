//! Wireboard CLI - simulate circuit board snapshots from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use wireboard::core::{SimulationSummary, TerminalNode};
use wireboard::{SimulationOptions, SimulationStatus, WireboardCore};

#[derive(Parser)]
#[command(name = "wireboard")]
#[command(about = "Circuit board simulation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a board snapshot until it converges or stalls
    Simulate {
        /// Path to a board snapshot (.json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Passes allowed before the board is declared stalled
        #[arg(long)]
        max_passes: Option<usize>,

        /// JSON file with simulation options
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Exit with code 2 if the board does not converge
        #[arg(long)]
        fail_on_stall: bool,
    },

    /// Print the electrical node of every connection point
    Nodes {
        /// Path to a board snapshot (.json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List built-in component types
    Components {
        /// Show terminals and properties
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Simulate {
            file,
            format,
            max_passes,
            config,
            fail_on_stall,
        } => handle_simulate(&file, format, max_passes, config.as_deref(), fail_on_stall),
        Commands::Nodes { file, format } => handle_nodes(&file, format),
        Commands::Components { verbose } => {
            handle_components(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(config: Option<&Path>, max_passes: Option<usize>) -> anyhow::Result<SimulationOptions> {
    let mut options = match config {
        Some(path) => SimulationOptions::from_file(path)?,
        None => SimulationOptions::default(),
    };
    if let Some(max_passes) = max_passes {
        anyhow::ensure!(max_passes > 0, "--max-passes must be at least 1");
        options.max_passes = max_passes;
    }
    Ok(options)
}

fn handle_simulate(
    file: &Path,
    format: OutputFormat,
    max_passes: Option<usize>,
    config: Option<&Path>,
    fail_on_stall: bool,
) -> i32 {
    let options = match load_options(config, max_passes) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match WireboardCore::new(options).simulate_file(file) {
        Ok(summary) => {
            match format {
                OutputFormat::Human => output_human(file, &summary),
                OutputFormat::Json => output_json(file, &summary),
            }
            if fail_on_stall && !summary.is_stable() {
                return 2;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_human(file: &Path, summary: &SimulationSummary) {
    println!("\nBoard: {}", file.display());
    if !summary.name.is_empty() {
        println!("Name:  {}", summary.name);
    }
    println!("{}", "─".repeat(60));

    let status = match summary.report.status {
        SimulationStatus::Converged => "CONVERGED",
        SimulationStatus::Stalled => "STALLED (values frozen at last pass)",
    };
    println!("  Status: {}", status);
    println!("  Passes: {}", summary.report.passes);
    println!("  Nodes:  {}", summary.report.node_count);

    println!("\n  Components:");
    for component in &summary.components {
        let shown: Vec<String> = component
            .properties
            .iter()
            .filter(|p| p.displayable)
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        println!("    {} {:<12} {}", component.id, component.type_id, shown.join(" "));
    }

    if !summary.report.floating_inputs.is_empty() {
        println!("\n  Floating inputs:");
        for input in &summary.report.floating_inputs {
            println!("    - {} terminal {}", input.component, input.terminal);
        }
    }
}

fn output_json(file: &Path, summary: &SimulationSummary) {
    let output = serde_json::json!({
        "file": file.display().to_string(),
        "name": summary.name,
        "status": summary.report.status,
        "passes": summary.report.passes,
        "node_count": summary.report.node_count,
        "floating_inputs": summary.report.floating_inputs,
        "components": summary.components,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_nodes(file: &Path, format: OutputFormat) -> i32 {
    match WireboardCore::default().node_table(file) {
        Ok(table) => {
            match format {
                OutputFormat::Human => output_nodes_human(&table),
                OutputFormat::Json => match serde_json::to_string_pretty(&table) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return 1;
                    }
                },
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_nodes_human(table: &[TerminalNode]) {
    for entry in table {
        println!(
            "  {:<5} {}.{} ({})",
            entry.node.to_string(),
            entry.component,
            entry.terminal,
            entry.type_id
        );
    }
}

fn handle_components(verbose: bool) {
    println!("Available component types:\n");

    let core = WireboardCore::default();
    let registry = core.registry();
    for type_id in registry.type_ids() {
        println!("  {}", type_id);
        if verbose {
            if let Some(constructor) = registry.find(type_id) {
                let component = constructor();
                let terminals: Vec<&str> =
                    component.terminals().iter().map(|t| t.name.as_str()).collect();
                let editable: Vec<&str> = component
                    .properties()
                    .iter()
                    .filter(|p| p.editable)
                    .map(|p| p.name)
                    .collect();
                println!("    terminals:  {}", terminals.join(", "));
                if !editable.is_empty() {
                    println!("    properties: {}", editable.join(", "));
                }
            }
        }
    }
    println!("\n  custom:<definition id>");
    if verbose {
        println!("    instances of custom components defined in a snapshot");
    }
}
