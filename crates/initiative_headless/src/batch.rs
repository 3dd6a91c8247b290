//! Batch runner for seed sweeps.
//!
//! Plays one scenario under many consecutive seeds in parallel using rayon.
//! Each game owns its own session, so any state leaking between games shows
//! up as a result that differs from a sequential replay of the same seed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::runner::run_scenario;
use crate::scenario::Scenario;

/// File name used by [`BatchResults::save_to_output`].
pub const RESULTS_FILE: &str = "batch_results.json";

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name, for reports
    pub scenario: String,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "skirmish".to_string(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Per-game summary kept in batch results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Game index within the batch
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Rounds played
    pub rounds: u32,
    /// Initiative wins per team
    pub wins: BTreeMap<String, u32>,
    /// Highest compensation bonus per team
    pub peak_compensation: BTreeMap<String, u32>,
    /// Hash of the full game report
    pub state_hash: u64,
}

/// Aggregate over every completed game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games completed
    pub total_games: u32,
    /// Rounds played across all games
    pub total_rounds: u32,
    /// Initiative wins per team
    pub wins: BTreeMap<String, u32>,
    /// Share of rounds won per team
    pub win_rates: BTreeMap<String, f64>,
    /// Highest compensation bonus seen per team
    pub peak_compensation: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Aggregate per-game summaries.
    #[must_use]
    pub fn from_games(games: &[GameSummary]) -> Self {
        let mut summary = Self {
            total_games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        for game in games {
            summary.total_rounds = summary.total_rounds.saturating_add(game.rounds);
            for (team, &wins) in &game.wins {
                let entry = summary.wins.entry(team.clone()).or_insert(0);
                *entry = entry.saturating_add(wins);
            }
            for (team, &peak) in &game.peak_compensation {
                let entry = summary.peak_compensation.entry(team.clone()).or_insert(0);
                *entry = (*entry).max(peak);
            }
        }
        let rounds = f64::from(summary.total_rounds.max(1));
        summary.win_rates = summary
            .wins
            .iter()
            .map(|(team, &wins)| (team.clone(), f64::from(wins) / rounds))
            .collect();
        summary
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game summaries
    pub games: Vec<GameSummary>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Save results as `batch_results.json` in the configured output directory.
    pub fn save_to_output(&self) -> std::io::Result<PathBuf> {
        let path = self.config.output_dir.join(RESULTS_FILE);
        self.save(&path)?;
        Ok(path)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

fn run_single_game(scenario: &Scenario, game_index: u32, seed: u64) -> Result<GameSummary, String> {
    let report = run_scenario(scenario, seed).map_err(|e| e.to_string())?;
    Ok(GameSummary {
        game_index,
        seed,
        rounds: u32::try_from(report.rounds.len()).unwrap_or(u32::MAX),
        wins: report.wins_by_team(),
        peak_compensation: report.peak_compensation(),
        state_hash: report.state_hash(),
    })
}

/// Run a batch of games
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.scenario
    );

    // Configure thread pool if specified
    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameSummary, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_single_game(scenario, i, seed) {
                Ok(game) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 100 == 0 {
                        debug!("Progress: {}/{}", done, config.game_count);
                    }
                    Ok(game)
                }
                Err(message) => {
                    warn!("Game {} failed: {}", i, message);
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message,
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameSummary> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({} failed)",
        games.len(),
        duration_seconds,
        errors.len()
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Replay every game of a batch sequentially and compare hashes.
///
/// Returns the indices of games whose replay differs.
pub fn replay_mismatches(scenario: &Scenario, results: &BatchResults) -> Vec<u32> {
    results
        .games
        .iter()
        .filter(|game| {
            run_single_game(scenario, game.game_index, game.seed)
                .map_or(true, |replay| replay.state_hash != game.state_hash)
        })
        .map(|game| game.game_index)
        .collect()
}
