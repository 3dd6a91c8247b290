//! Headless round runner for initiative verification.
//!
//! This crate plays scenarios through the initiative engine without a game
//! client attached. This enables:
//!
//! - **Rule inspection**: Print every round's rolls and turn order
//! - **Seed sweeps**: Tally initiative wins and compensation across many games
//! - **CI verification**: Check that a seed always replays identically
//!
//! # Output
//!
//! - **stdout**: One JSON round report per line
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Play the built-in skirmish
//! cargo run -p initiative_headless -- run
//!
//! # Play a scenario file with a fixed seed
//! cargo run -p initiative_headless -- run --scenario scenarios/skirmish.ron --seed 7
//!
//! # Verify determinism
//! cargo run -p initiative_headless -- verify --runs 5
//! ```

pub mod batch;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use runner::{run_scenario, verify_determinism, GameReport, RoundReport};
pub use scenario::{Scenario, ScenarioError, TeamSetup, UnitCounts};
