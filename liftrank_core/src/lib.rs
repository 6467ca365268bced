#![forbid(unsafe_code)]

//! Core scoring model for LiftRank.
//!
//! This crate provides:
//! - Domain types (profiles, workouts, lift observations)
//! - Benchmark tables and per-exercise percentiles
//! - Tier classification, overall scoring and rank-up detection
//! - Workout volume statistics and period rollups
//! - Persistence (JSONL history, CSV export, rank snapshot)

pub mod types;
pub mod error;
pub mod benchmark;
pub mod percentile;
pub mod tier;
pub mod workout_stats;
pub mod overall;
pub mod transition;
pub mod engine;
pub mod config;
pub mod logging;
pub mod wal;
pub mod history;
pub mod csv_rollup;
pub mod state;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use benchmark::{builtin_table, BenchmarkTable};
pub use percentile::{MaxEstimator, PercentileCalculator, SelectionPolicy};
pub use tier::{base_tier, Grade, Modifier, Tier};
pub use workout_stats::{rollup, stats_for, Period, PeriodKey, WorkoutStats};
pub use overall::{overall_stats_for, OverallStats, Weighting};
pub use transition::{transition, transition_between, TierTransition};
pub use engine::{RankEngine, RecordOutcome};
pub use config::Config;
pub use wal::{JsonlSink, WorkoutSink};
pub use history::load_recent_workouts;
pub use state::RankSnapshot;
