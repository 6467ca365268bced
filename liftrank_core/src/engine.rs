//! Rank engine tying the pure components together.
//!
//! Holds the current per-exercise percentiles for one user and recomputes
//! the overall score only when that set actually changes. Callers feed it
//! data-change events (a lift was saved, history was reloaded after a profile
//! update); nothing here depends on when or how often results are displayed.

use crate::benchmark::BenchmarkTable;
use crate::config::ScoringConfig;
use crate::overall::{overall_stats_for, OverallStats};
use crate::percentile::{supersedes, PercentileCalculator};
use crate::transition::{transition_between, TierTransition};
use crate::{ExercisePercentile, LiftObservation, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// What recording a batch of lifts changed
#[derive(Clone, Debug, PartialEq)]
pub struct RecordOutcome {
    /// Exercises whose current percentile was replaced
    pub updated: Vec<ExercisePercentile>,
    pub overall: OverallStats,
    /// Present when both the old and new overall have data
    pub transition: Option<TierTransition>,
}

impl RecordOutcome {
    pub fn is_rank_up(&self) -> bool {
        self.transition.is_some_and(|t| t.is_rank_up())
    }
}

/// Memoizing scorer for one user
#[derive(Clone, Debug)]
pub struct RankEngine {
    table: Arc<BenchmarkTable>,
    scoring: ScoringConfig,
    percentiles: BTreeMap<String, ExercisePercentile>,
    cached: Option<OverallStats>,
    recomputations: u64,
}

impl RankEngine {
    pub fn new(table: Arc<BenchmarkTable>, scoring: ScoringConfig) -> Self {
        Self {
            table,
            scoring,
            percentiles: BTreeMap::new(),
            cached: None,
            recomputations: 0,
        }
    }

    /// Build an engine from a full observation history
    pub fn from_history(
        table: Arc<BenchmarkTable>,
        scoring: ScoringConfig,
        observations: &[LiftObservation],
    ) -> Result<Self> {
        let mut engine = Self::new(table, scoring);
        engine.percentiles = engine
            .calculator()
            .current_percentiles(observations, engine.scoring.selection)?;

        tracing::info!(
            "Scored {} observations into {} exercise percentiles",
            observations.len(),
            engine.percentiles.len()
        );
        Ok(engine)
    }

    pub fn calculator(&self) -> PercentileCalculator<'_> {
        PercentileCalculator::new(&self.table, self.scoring.estimator)
    }

    pub fn table(&self) -> &BenchmarkTable {
        &self.table
    }

    pub fn percentiles(&self) -> &BTreeMap<String, ExercisePercentile> {
        &self.percentiles
    }

    /// Current overall stats, recomputed only after the percentiles changed
    pub fn overall(&mut self) -> &OverallStats {
        if self.cached.is_none() {
            self.recomputations += 1;
            tracing::debug!("Recomputing overall stats (#{})", self.recomputations);
        }
        self.cached
            .get_or_insert_with(|| overall_stats_for(&self.percentiles, &self.scoring.weighting))
    }

    /// Score one lift and fold it into the current percentiles
    pub fn record_lift(&mut self, observation: &LiftObservation) -> Result<RecordOutcome> {
        self.record_lifts(std::slice::from_ref(observation))
    }

    /// Score a batch of lifts (e.g. one workout) and report the net change
    ///
    /// The whole batch is validated before anything is applied.
    pub fn record_lifts(&mut self, observations: &[LiftObservation]) -> Result<RecordOutcome> {
        let calculator = self.calculator();
        let mut scored = Vec::with_capacity(observations.len());
        for observation in observations {
            if let Some(percentile) = calculator.percentile_for_observation(observation)? {
                scored.push(ExercisePercentile {
                    exercise_id: observation.exercise_id.clone(),
                    percentile,
                    timestamp: observation.timestamp,
                });
            }
        }

        let previous = self.overall().clone();
        let policy = self.scoring.selection;
        let mut updated: BTreeMap<String, ExercisePercentile> = BTreeMap::new();

        for candidate in scored {
            let replace = match self.percentiles.get(&candidate.exercise_id) {
                Some(existing) => supersedes(&candidate, existing, policy),
                None => true,
            };
            if replace {
                self.percentiles
                    .insert(candidate.exercise_id.clone(), candidate.clone());
                updated.insert(candidate.exercise_id.clone(), candidate);
            }
        }

        if !updated.is_empty() {
            self.cached = None;
        }

        let overall = self.overall().clone();
        let transition = transition_between(&previous, &overall);

        if let Some(t) = transition.filter(|t| t.tier_changed) {
            tracing::info!("Tier changed: {} → {}", t.previous_tier, t.new_tier);
        }

        Ok(RecordOutcome {
            updated: updated.into_values().collect(),
            overall,
            transition,
        })
    }
}
