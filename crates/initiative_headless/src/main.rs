//! Headless initiative runner.
//!
//! Plays scenarios through the initiative engine and prints the result of
//! every round. Designed for rule inspection, seed sweeps and CI checks.
//!
//! # Usage
//!
//! ```bash
//! # Play a single game and print one JSON report per round
//! cargo run -p initiative_headless -- run --scenario scenarios/skirmish.ron
//!
//! # Sweep 1000 seeds in parallel
//! cargo run -p initiative_headless -- batch --count 1000 --output results/
//!
//! # Verify that a seed replays identically
//! cargo run -p initiative_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Output (stdout): JSON round reports, one per line
//! Logs (stderr): Debug information

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use initiative_headless::{
    batch::{replay_mismatches, run_batch, BatchConfig},
    runner::{run_scenario, verify_determinism},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "initiative_headless")]
#[command(about = "Headless initiative runner for rule checks and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game and print every round
    Run {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed override
        #[arg(long)]
        seed: Option<u64>,

        /// Round count override
        #[arg(short, long)]
        rounds: Option<u32>,
    },

    /// Play many seeds in parallel and tally the results
    Batch {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Replay every game sequentially and compare hashes
        #[arg(long)]
        check: bool,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            rounds,
        }) => {
            cmd_run(scenario, seed, rounds);
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            check,
        }) => {
            cmd_batch(scenario, count, parallel, output, seed, check);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            cmd_verify(scenario, seed, runs);
        }
        None => {
            cmd_run(None, None, None);
        }
    }
}

/// Load a scenario file or fall back to the built-in skirmish.
fn load_scenario(path: Option<PathBuf>) -> Scenario {
    let Some(path) = path else {
        return Scenario::skirmish();
    };
    tracing::info!("Loading scenario: {}", path.display());
    match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            process::exit(1);
        }
    }
}

/// Play a single game
fn cmd_run(scenario: Option<PathBuf>, seed: Option<u64>, rounds: Option<u32>) {
    let mut scenario = load_scenario(scenario);
    if let Some(rounds) = rounds {
        scenario.rounds = rounds;
    }
    let seed = seed.unwrap_or(scenario.seed);

    let report = match run_scenario(&scenario, seed) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("FAIL: {}", e);
            process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for round in &report.rounds {
        let line = match serde_json::to_string(round) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Failed to encode round {}: {}", round.round, e);
                process::exit(1);
            }
        };
        if writeln!(out, "{}", line).is_err() {
            // Reader went away; nothing more to say.
            return;
        }
    }

    eprintln!("State hash: {:016x}", report.state_hash());
}

/// Play many seeds in parallel
fn cmd_batch(
    scenario: Option<PathBuf>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    check: bool,
) {
    let scenario = load_scenario(scenario);

    tracing::info!(
        scenario = %scenario.name,
        count = count,
        parallel = parallel,
        seed = seed,
        output = %output.display(),
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        process::exit(1);
    }

    let mut config = BatchConfig::new(&scenario.name, count)
        .with_output(output.clone())
        .with_seed(seed);
    config.parallel_games = parallel;

    let results = run_batch(&scenario, config);

    let results_path = match results.save_to_output() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, path = %output.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {}", e);
            process::exit(1);
        }
    };

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Rounds played: {}", results.summary.total_rounds);
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("\nInitiative win rates:");
    for (team, rate) in &results.summary.win_rates {
        eprintln!("  {}: {:.1}%", team, rate * 100.0);
    }
    eprintln!("\nPeak compensation:");
    for (team, peak) in &results.summary.peak_compensation {
        eprintln!("  {}: +{}", team, peak);
    }

    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Game {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());

    if check {
        let mismatches = replay_mismatches(&scenario, &results);
        if mismatches.is_empty() {
            eprintln!("PASS: Every game replayed identically");
        } else {
            eprintln!("FAIL: {} games replayed differently", mismatches.len());
            for index in mismatches.iter().take(10) {
                eprintln!("  Game {}", index);
            }
            process::exit(1);
        }
    }
}

/// Verify determinism
fn cmd_verify(scenario: Option<PathBuf>, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, seed, runs) {
        Ok(true) => eprintln!("PASS: All {} runs produced identical results", runs),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("FAIL: {}", e);
            process::exit(1);
        }
    }
}
