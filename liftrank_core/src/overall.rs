//! Overall strength score across all tracked exercises.

use crate::tier::{Grade, Tier};
use crate::{Error, ExercisePercentile, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest per-exercise weight accepted; keeps the weighted sum finite
pub const MAX_WEIGHT: f64 = 1.0e6;

fn usable_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0 && weight <= MAX_WEIGHT
}

fn default_weight() -> f64 {
    1.0
}

/// How per-exercise percentiles are weighted in the overall mean
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Weighting {
    /// Every exercise counts the same
    #[default]
    Equal,
    /// Explicit per-exercise weights; unlisted exercises use `default_weight`
    Custom {
        #[serde(default)]
        weights: BTreeMap<String, f64>,
        #[serde(default = "default_weight")]
        default_weight: f64,
    },
}

impl Weighting {
    pub fn weight_for(&self, exercise_id: &str) -> f64 {
        match self {
            Weighting::Equal => 1.0,
            Weighting::Custom {
                weights,
                default_weight,
            } => weights.get(exercise_id).copied().unwrap_or(*default_weight),
        }
    }

    /// All weights must be positive and at most [`MAX_WEIGHT`]
    pub fn validate(&self) -> Result<()> {
        let Weighting::Custom {
            weights,
            default_weight,
        } = self
        else {
            return Ok(());
        };

        let bad = std::iter::once(("default", default_weight))
            .chain(weights.iter().map(|(id, w)| (id.as_str(), w)))
            .find(|(_, w)| !usable_weight(**w));

        match bad {
            Some((id, w)) => Err(Error::config(format!(
                "weight for '{}' must be in (0, {}], got {}",
                id, MAX_WEIGHT, w
            ))),
            None => Ok(()),
        }
    }
}

/// Aggregate strength standing, always derived from per-exercise percentiles
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OverallStats {
    /// `None` when no exercise has benchmark data
    pub overall_percentile: Option<f64>,
    /// Tier of the unrounded overall percentile; `E` for display when no data
    pub strength_level: Tier,
    pub per_exercise: BTreeMap<String, ExercisePercentile>,
}

impl OverallStats {
    pub fn no_data() -> Self {
        Self {
            overall_percentile: None,
            strength_level: Tier::E,
            per_exercise: BTreeMap::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.overall_percentile.is_some()
    }

    /// Whole-number percentile for display; `0` when there is no data
    pub fn display_percentile(&self) -> u8 {
        self.overall_percentile
            .map(|p| p.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }

    /// Display grade such as "A+", absent without data
    pub fn grade(&self) -> Option<Grade> {
        self.overall_percentile
            .and_then(|p| Grade::for_percentile(p).ok())
    }
}

impl Default for OverallStats {
    fn default() -> Self {
        Self::no_data()
    }
}

/// Combine per-exercise percentiles into one overall score
///
/// Entries with a non-finite or out-of-range percentile, or a weight outside
/// `(0, MAX_WEIGHT]`, are treated as absent. Weights are looked up by map
/// key. A single usable entry is returned exactly.
/// The result depends only on the inputs.
pub fn overall_stats_for(
    per_exercise: &BTreeMap<String, ExercisePercentile>,
    weighting: &Weighting,
) -> OverallStats {
    let usable: Vec<(f64, f64)> = per_exercise
        .iter()
        .filter(|(_, entry)| entry.percentile.is_finite() && (0.0..=100.0).contains(&entry.percentile))
        .map(|(exercise_id, entry)| (entry.percentile, weighting.weight_for(exercise_id)))
        .filter(|(_, weight)| usable_weight(*weight))
        .collect();

    if usable.len() < per_exercise.len() {
        tracing::warn!(
            "Ignoring {} unusable exercise percentile(s)",
            per_exercise.len() - usable.len()
        );
    }

    let overall = match usable.as_slice() {
        [] => None,
        [(percentile, _)] => Some(*percentile),
        entries => {
            let (weighted, total) = entries
                .iter()
                .fold((0.0, 0.0), |(sum, total), (p, w)| (sum + p * w, total + w));
            Some((weighted / total).clamp(0.0, 100.0))
        }
    };

    let strength_level = overall
        .and_then(|p| Tier::for_percentile(p).ok())
        .unwrap_or(Tier::E);

    tracing::debug!(
        "Overall from {} exercises: {:?} ({})",
        usable.len(),
        overall,
        strength_level
    );

    OverallStats {
        overall_percentile: overall,
        strength_level,
        per_exercise: per_exercise.clone(),
    }
}
