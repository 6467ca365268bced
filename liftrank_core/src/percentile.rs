//! Per-exercise percentile calculation.
//!
//! Turns one lift (weight × reps at a bodyweight) into a percentile against
//! the benchmark curve for that exercise and sex:
//!
//! 1. Normalize weight and bodyweight to pounds
//! 2. Estimate a single-effort max from multi-rep sets
//! 3. Divide by bodyweight for relative-scale exercises
//! 4. Interpolate on the benchmark curve
//!
//! An exercise without a curve yields `Ok(None)`, never an error.

use crate::benchmark::{BenchmarkTable, Scale};
use crate::{Error, ExercisePercentile, LiftObservation, Result, Sex, WeightUnit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reps beyond this are treated as this many for max estimation
pub const MAX_ESTIMATION_REPS: u32 = 15;

/// Formula used to turn a multi-rep set into an estimated single-rep max
///
/// Every variant is non-decreasing in both weight and reps, and a single
/// rep always estimates to the raw weight.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxEstimator {
    /// `w × (1 + r/30)`
    #[default]
    Epley,
    /// `w × 36 / (37 − r)`
    Brzycki,
    /// `w × 100 / (101.3 − 2.67 r)`
    Lander,
    /// Mean of Epley, Brzycki and Lander
    Average,
}

impl MaxEstimator {
    pub fn estimate(self, weight: f64, reps: u32) -> f64 {
        if reps <= 1 {
            return weight;
        }

        let r = f64::from(reps.min(MAX_ESTIMATION_REPS));
        let epley = || weight * (1.0 + r / 30.0);
        let brzycki = || weight * 36.0 / (37.0 - r);
        let lander = || weight * 100.0 / (101.3 - 2.67 * r);

        match self {
            MaxEstimator::Epley => epley(),
            MaxEstimator::Brzycki => brzycki(),
            MaxEstimator::Lander => lander(),
            MaxEstimator::Average => (epley() + brzycki() + lander()) / 3.0,
        }
    }
}

/// Which observation sets an exercise's current percentile
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Highest percentile seen (personal record); ties keep the earliest
    #[default]
    Best,
    /// Most recent observation; same-instant ties keep the higher percentile
    Latest,
}

/// Scores lifts against a benchmark table
#[derive(Clone, Copy, Debug)]
pub struct PercentileCalculator<'a> {
    table: &'a BenchmarkTable,
    estimator: MaxEstimator,
}

impl<'a> PercentileCalculator<'a> {
    pub fn new(table: &'a BenchmarkTable, estimator: MaxEstimator) -> Self {
        Self { table, estimator }
    }

    /// Percentile for one lift, or `None` when the table has no curve for it
    ///
    /// `bodyweight` is in the same `unit` as `weight`.
    pub fn percentile_for(
        &self,
        exercise_id: &str,
        weight: f64,
        unit: WeightUnit,
        reps: u32,
        bodyweight: f64,
        sex: Sex,
    ) -> Result<Option<f64>> {
        if reps == 0 {
            return Err(Error::invalid(format!(
                "reps must be at least 1 for '{}'",
                exercise_id
            )));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::invalid(format!(
                "weight must be non-negative for '{}', got {}",
                exercise_id, weight
            )));
        }
        if !bodyweight.is_finite() || bodyweight <= 0.0 {
            return Err(Error::invalid(format!(
                "bodyweight must be positive, got {}",
                bodyweight
            )));
        }

        let Some(exercise) = self.table.exercise(exercise_id) else {
            tracing::debug!(
                "No benchmark for '{}' in table '{}'",
                exercise_id,
                self.table.version()
            );
            return Ok(None);
        };
        let Some(curve) = exercise.curves.get(&sex) else {
            tracing::debug!("No {} benchmark curve for '{}'", sex, exercise_id);
            return Ok(None);
        };

        let estimated_max = self.estimator.estimate(unit.to_lbs(weight), reps);
        let relative_strength = match exercise.scale {
            Scale::Relative => estimated_max / unit.to_lbs(bodyweight),
            Scale::Absolute => estimated_max,
        };

        let percentile = curve.percentile_at(relative_strength, self.table.interpolation());

        tracing::debug!(
            "{} {}{} x{} → est. max {:.1} lbs, strength {:.3}, percentile {:.2}",
            exercise_id,
            weight,
            unit,
            reps,
            estimated_max,
            relative_strength,
            percentile
        );

        Ok(Some(percentile))
    }

    pub fn percentile_for_observation(&self, observation: &LiftObservation) -> Result<Option<f64>> {
        self.percentile_for(
            &observation.exercise_id,
            observation.weight,
            observation.unit,
            observation.reps,
            observation.bodyweight,
            observation.sex,
        )
    }

    /// Fold observations into one current percentile per exercise
    ///
    /// Observations without benchmark data are skipped. The result does not
    /// depend on the order of `observations`.
    pub fn current_percentiles(
        &self,
        observations: &[LiftObservation],
        policy: SelectionPolicy,
    ) -> Result<BTreeMap<String, ExercisePercentile>> {
        let mut current: BTreeMap<String, ExercisePercentile> = BTreeMap::new();

        for observation in observations {
            let Some(percentile) = self.percentile_for_observation(observation)? else {
                continue;
            };

            let candidate = ExercisePercentile {
                exercise_id: observation.exercise_id.clone(),
                percentile,
                timestamp: observation.timestamp,
            };

            match current.get(&observation.exercise_id) {
                Some(existing) if !supersedes(&candidate, existing, policy) => {}
                _ => {
                    current.insert(observation.exercise_id.clone(), candidate);
                }
            }
        }

        Ok(current)
    }
}

/// Whether `candidate` should replace `existing` under `policy`
pub(crate) fn supersedes(
    candidate: &ExercisePercentile,
    existing: &ExercisePercentile,
    policy: SelectionPolicy,
) -> bool {
    match policy {
        SelectionPolicy::Best => {
            candidate.percentile > existing.percentile
                || (candidate.percentile == existing.percentile
                    && candidate.timestamp < existing.timestamp)
        }
        SelectionPolicy::Latest => {
            candidate.timestamp > existing.timestamp
                || (candidate.timestamp == existing.timestamp
                    && candidate.percentile > existing.percentile)
        }
    }
}
