//! Core domain types for the LiftRank system.
//!
//! This module defines the input-side types shared across the engine:
//! - Units and sex used for benchmark normalization
//! - The user profile passed explicitly into every computation
//! - Lift observations and per-exercise percentiles
//! - Workouts with explicitly tagged weight/cardio tracking

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Pounds per kilogram. Pounds are the canonical unit inside the engine.
pub const LBS_PER_KG: f64 = 2.204_622_621_848_776;

// ============================================================================
// Units and Sex
// ============================================================================

/// Unit a weight value was entered in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    /// Convert a value in this unit to pounds
    pub fn to_lbs(self, value: f64) -> f64 {
        match self {
            WeightUnit::Lbs => value,
            WeightUnit::Kg => value * LBS_PER_KG,
        }
    }

    /// Convert a value in pounds to this unit
    pub fn from_lbs(self, lbs: f64) -> f64 {
        match self {
            WeightUnit::Lbs => lbs,
            WeightUnit::Kg => lbs / LBS_PER_KG,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Lbs => write!(f, "lbs"),
            WeightUnit::Kg => write!(f, "kg"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            other => Err(Error::invalid(format!("unknown weight unit '{}'", other))),
        }
    }
}

/// Sex used to select a benchmark curve
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            other => Err(Error::invalid(format!("unknown sex '{}'", other))),
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Per-user inputs supplied by the profile store
///
/// Passed explicitly into each computation; the engine never reads ambient
/// application state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub bodyweight: f64,
    pub unit: WeightUnit,
    pub sex: Sex,
}

impl Profile {
    /// Build a profile, rejecting a non-positive or non-finite bodyweight
    pub fn new(bodyweight: f64, unit: WeightUnit, sex: Sex) -> Result<Self> {
        if !bodyweight.is_finite() || bodyweight <= 0.0 {
            return Err(Error::invalid(format!(
                "bodyweight must be positive, got {}",
                bodyweight
            )));
        }
        Ok(Self {
            bodyweight,
            unit,
            sex,
        })
    }

    pub fn bodyweight_lbs(&self) -> f64 {
        self.unit.to_lbs(self.bodyweight)
    }
}

// ============================================================================
// Lift Observations and Percentiles
// ============================================================================

/// One performed lift, ready to be scored against a benchmark curve
///
/// `bodyweight` is expressed in the same `unit` as `weight`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LiftObservation {
    pub exercise_id: String,
    pub weight: f64,
    pub unit: WeightUnit,
    pub reps: u32,
    pub bodyweight: f64,
    pub sex: Sex,
    pub timestamp: DateTime<Utc>,
}

/// Current percentile for one exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExercisePercentile {
    pub exercise_id: String,
    pub percentile: f64,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Workouts
// ============================================================================

/// A completed weight-based set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightSet {
    pub weight: f64,
    pub unit: WeightUnit,
    pub reps: u32,
}

/// A completed cardio set (distance and/or duration)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct CardioSet {
    pub distance_meters: f64,
    pub duration_seconds: u32,
}

/// How an exercise was tracked, carrying its completed sets
///
/// The variant decides which totals a set may contribute to, so weight and
/// cardio units can never be summed together.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "sets", rename_all = "snake_case")]
pub enum Tracking {
    Weight(Vec<WeightSet>),
    Cardio(Vec<CardioSet>),
}

impl Tracking {
    pub fn is_cardio(&self) -> bool {
        matches!(self, Tracking::Cardio(_))
    }
}

/// One exercise within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseLog {
    pub exercise_id: String,
    pub tracking: Tracking,
}

/// A logged workout as supplied by the workout history store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub performed_at: DateTime<Utc>,
    /// Bodyweight in pounds at the time of the workout, when known
    #[serde(default)]
    pub bodyweight_lbs: Option<f64>,
    pub exercises: Vec<ExerciseLog>,
}

impl Workout {
    /// Derive one lift observation per completed weight set
    ///
    /// The workout's recorded bodyweight wins over the profile's current one.
    pub fn lift_observations(&self, profile: &Profile) -> Vec<LiftObservation> {
        let bodyweight_lbs = self
            .bodyweight_lbs
            .unwrap_or_else(|| profile.bodyweight_lbs());

        self.exercises
            .iter()
            .filter_map(|exercise| match &exercise.tracking {
                Tracking::Weight(sets) => Some((exercise, sets)),
                Tracking::Cardio(_) => None,
            })
            .flat_map(|(exercise, sets)| {
                sets.iter().map(move |set| LiftObservation {
                    exercise_id: exercise.exercise_id.clone(),
                    weight: set.weight,
                    unit: set.unit,
                    reps: set.reps,
                    bodyweight: set.unit.from_lbs(bodyweight_lbs),
                    sex: profile.sex,
                    timestamp: self.performed_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert_eq!(WeightUnit::Lbs.to_lbs(135.0), 135.0);
        assert!((WeightUnit::Kg.to_lbs(100.0) - 220.462_262).abs() < 1e-5);
        assert!((WeightUnit::Kg.from_lbs(WeightUnit::Kg.to_lbs(80.0)) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_unit_and_sex() {
        assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lb".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert!("stone".parse::<WeightUnit>().is_err());

        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
        assert!("x".parse::<Sex>().is_err());
    }

    #[test]
    fn test_profile_rejects_bad_bodyweight() {
        assert!(Profile::new(0.0, WeightUnit::Lbs, Sex::Male).is_err());
        assert!(Profile::new(-5.0, WeightUnit::Lbs, Sex::Male).is_err());
        assert!(Profile::new(f64::NAN, WeightUnit::Lbs, Sex::Male).is_err());
        assert!(Profile::new(180.0, WeightUnit::Lbs, Sex::Male).is_ok());
    }

    #[test]
    fn test_lift_observations_skip_cardio() {
        let profile = Profile::new(80.0, WeightUnit::Kg, Sex::Female).unwrap();
        let workout = Workout {
            id: Uuid::new_v4(),
            performed_at: Utc::now(),
            bodyweight_lbs: None,
            exercises: vec![
                ExerciseLog {
                    exercise_id: "squat".into(),
                    tracking: Tracking::Weight(vec![
                        WeightSet { weight: 100.0, unit: WeightUnit::Kg, reps: 5 },
                        WeightSet { weight: 225.0, unit: WeightUnit::Lbs, reps: 3 },
                    ]),
                },
                ExerciseLog {
                    exercise_id: "run".into(),
                    tracking: Tracking::Cardio(vec![CardioSet {
                        distance_meters: 5000.0,
                        duration_seconds: 1500,
                    }]),
                },
            ],
        };

        let observations = workout.lift_observations(&profile);
        assert_eq!(observations.len(), 2);
        assert!(observations.iter().all(|o| o.exercise_id == "squat"));
        assert!(observations.iter().all(|o| o.sex == Sex::Female));
        assert!((observations[0].bodyweight - 80.0).abs() < 1e-9);
        assert!((observations[1].bodyweight - WeightUnit::Kg.to_lbs(80.0)).abs() < 1e-9);
    }

    #[test]
    fn test_tracking_serializes_tagged() {
        let log = ExerciseLog {
            exercise_id: "run".into(),
            tracking: Tracking::Cardio(vec![CardioSet::default()]),
        };
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains(r#""type":"cardio""#));
        let back: ExerciseLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
