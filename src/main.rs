//! repl-harness - scripted test driver for line-oriented debugger REPLs

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use repl_harness::common::logging;
use repl_harness::driver;
use repl_harness::script::Scenario;
use repl_harness::Result;

/// Default debugger listen port; scenarios reference it as `{port}`
const DEFAULT_PORT: u16 = 5858;

#[derive(Parser)]
#[command(name = "repl-harness", about = "Scripted test driver for line-oriented debugger REPLs")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario against its child process
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Port substituted for `{port}` in the target arguments
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Override the scenario's wall-clock budget, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Parse a scenario and report its turns without running it
    Check {
        /// Path to the scenario YAML file
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            port,
            timeout_secs,
        } => driver::run_scenario(&scenario, port, timeout_secs).await,
        Commands::Check { scenario } => check(&scenario),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn check(path: &std::path::Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    println!(
        "{} {} ({} turns, {}s budget)",
        "OK".green().bold(),
        scenario.name.white().bold(),
        scenario.turns.len(),
        scenario.timeout_secs
    );
    for (i, turn) in scenario.turns.iter().enumerate() {
        let input = turn
            .input
            .as_deref()
            .map(|s| format!("send {s:?}"))
            .unwrap_or_else(|| "no input".to_string());
        println!(
            "  {} {} {}, {} pattern(s)",
            "turn".dimmed(),
            i + 1,
            input.dimmed(),
            turn.expect.len()
        );
    }
    Ok(())
}
