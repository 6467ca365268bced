//! Workout volume, time and distance totals.
//!
//! Volume and distance are accumulated in integer fixed point (hundredths of
//! a pound, millimetres) so that [`WorkoutStats::combine`] is exactly
//! associative and commutative. Per-workout stats can then be folded into
//! day, week and all-time rollups in any order or chunking.

use crate::{Error, ExerciseLog, Result, Tracking, Workout};
use chrono::{Datelike, IsoWeek, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Totals for one workout, or a combination of workouts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct WorkoutStats {
    pub total_sets: u64,
    pub total_reps: u64,
    /// Weight × reps in hundredths of a pound
    pub total_volume_centi_lbs: u64,
    pub has_cardio_exercises: bool,
    /// Cardio distance in millimetres
    pub total_distance_mm: u64,
    pub total_cardio_duration_seconds: u64,
}

impl WorkoutStats {
    /// Identity for [`combine`](Self::combine)
    pub const ZERO: WorkoutStats = WorkoutStats {
        total_sets: 0,
        total_reps: 0,
        total_volume_centi_lbs: 0,
        has_cardio_exercises: false,
        total_distance_mm: 0,
        total_cardio_duration_seconds: 0,
    };

    /// Field-wise saturating sum, with the cardio flag OR-ed
    pub fn combine(self, other: WorkoutStats) -> WorkoutStats {
        WorkoutStats {
            total_sets: self.total_sets.saturating_add(other.total_sets),
            total_reps: self.total_reps.saturating_add(other.total_reps),
            total_volume_centi_lbs: self
                .total_volume_centi_lbs
                .saturating_add(other.total_volume_centi_lbs),
            has_cardio_exercises: self.has_cardio_exercises || other.has_cardio_exercises,
            total_distance_mm: self.total_distance_mm.saturating_add(other.total_distance_mm),
            total_cardio_duration_seconds: self
                .total_cardio_duration_seconds
                .saturating_add(other.total_cardio_duration_seconds),
        }
    }

    pub fn total_volume_lbs(&self) -> f64 {
        self.total_volume_centi_lbs as f64 / 100.0
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_mm as f64 / 1000.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for WorkoutStats {
    type Output = WorkoutStats;

    fn add(self, rhs: WorkoutStats) -> WorkoutStats {
        self.combine(rhs)
    }
}

impl Sum for WorkoutStats {
    fn sum<I: Iterator<Item = WorkoutStats>>(iter: I) -> WorkoutStats {
        iter.fold(WorkoutStats::ZERO, WorkoutStats::combine)
    }
}

impl<'a> Sum<&'a WorkoutStats> for WorkoutStats {
    fn sum<I: Iterator<Item = &'a WorkoutStats>>(iter: I) -> WorkoutStats {
        iter.copied().sum()
    }
}

fn to_fixed(value: f64, scale: f64, what: &str) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid(format!(
            "{} must be non-negative, got {}",
            what, value
        )));
    }
    let scaled = (value * scale).round();
    // u64::MAX as f64 rounds up to 2^64, which itself does not fit
    if scaled >= u64::MAX as f64 {
        return Err(Error::invalid(format!("{} too large, got {}", what, value)));
    }
    Ok(scaled as u64)
}

fn add_checked(total: &mut u64, amount: u64, what: &str) -> Result<()> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| Error::invalid(format!("{} total overflows", what)))?;
    Ok(())
}

/// Totals for one workout's exercises
///
/// Weight sets add `weight × reps` to volume (in pounds) and count towards
/// sets and reps; cardio sets add distance and duration only.
pub fn stats_for(exercises: &[ExerciseLog]) -> Result<WorkoutStats> {
    let mut stats = WorkoutStats::ZERO;

    for exercise in exercises {
        match &exercise.tracking {
            Tracking::Weight(sets) => {
                let what = format!("'{}' volume", exercise.exercise_id);
                for set in sets {
                    let volume_lbs = set.unit.to_lbs(set.weight) * f64::from(set.reps);
                    let volume = to_fixed(volume_lbs, 100.0, &what)?;
                    add_checked(&mut stats.total_volume_centi_lbs, volume, &what)?;
                    add_checked(&mut stats.total_sets, 1, "set")?;
                    add_checked(&mut stats.total_reps, u64::from(set.reps), "rep")?;
                }
            }
            Tracking::Cardio(sets) => {
                stats.has_cardio_exercises = true;
                let what = format!("'{}' distance", exercise.exercise_id);
                for set in sets {
                    let distance = to_fixed(set.distance_meters, 1000.0, &what)?;
                    add_checked(&mut stats.total_distance_mm, distance, &what)?;
                    add_checked(
                        &mut stats.total_cardio_duration_seconds,
                        u64::from(set.duration_seconds),
                        "cardio duration",
                    )?;
                }
            }
        }
    }

    Ok(stats)
}

// ============================================================================
// Rollups
// ============================================================================

/// Time window for grouping workouts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    AllTime,
}

/// Key of one rollup bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    /// Calendar date (UTC)
    Day(NaiveDate),
    /// ISO week-numbering year and week
    Week { year: i32, week: u32 },
    AllTime,
}

impl PeriodKey {
    pub fn for_date(period: Period, date: NaiveDate) -> Self {
        match period {
            Period::Day => PeriodKey::Day(date),
            Period::Week => {
                let iso: IsoWeek = date.iso_week();
                PeriodKey::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Period::AllTime => PeriodKey::AllTime,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PeriodKey::Week { year, week } => write!(f, "{}-W{:02}", year, week),
            PeriodKey::AllTime => write!(f, "all-time"),
        }
    }
}

/// Group workouts by period and combine their stats
pub fn rollup(workouts: &[Workout], period: Period) -> Result<BTreeMap<PeriodKey, WorkoutStats>> {
    let mut buckets: BTreeMap<PeriodKey, WorkoutStats> = BTreeMap::new();

    for workout in workouts {
        let key = PeriodKey::for_date(period, workout.performed_at.date_naive());
        let stats = stats_for(&workout.exercises)?;
        let bucket = buckets.entry(key).or_insert(WorkoutStats::ZERO);
        *bucket = bucket.combine(stats);
    }

    tracing::debug!(
        "Rolled up {} workouts into {} {:?} buckets",
        workouts.len(),
        buckets.len(),
        period
    );
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardioSet, WeightSet, WeightUnit};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn weight(exercise: &str, sets: &[(f64, u32)]) -> ExerciseLog {
        ExerciseLog {
            exercise_id: exercise.into(),
            tracking: Tracking::Weight(
                sets.iter()
                    .map(|(weight, reps)| WeightSet {
                        weight: *weight,
                        unit: WeightUnit::Lbs,
                        reps: *reps,
                    })
                    .collect(),
            ),
        }
    }

    fn cardio(exercise: &str, distance_meters: f64, duration_seconds: u32) -> ExerciseLog {
        ExerciseLog {
            exercise_id: exercise.into(),
            tracking: Tracking::Cardio(vec![CardioSet {
                distance_meters,
                duration_seconds,
            }]),
        }
    }

    fn workout(day: u32, exercises: Vec<ExerciseLog>) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            performed_at: Utc.with_ymd_and_hms(2024, 3, day, 18, 0, 0).unwrap(),
            bodyweight_lbs: None,
            exercises,
        }
    }

    #[test]
    fn test_weight_volume() {
        let stats = stats_for(&[weight("squat", &[(225.0, 5), (245.0, 3)])]).unwrap();
        assert_eq!(stats.total_sets, 2);
        assert_eq!(stats.total_reps, 8);
        assert_eq!(stats.total_volume_lbs(), 225.0 * 5.0 + 245.0 * 3.0);
        assert!(!stats.has_cardio_exercises);
    }

    #[test]
    fn test_kg_volume_is_in_lbs() {
        let exercise = ExerciseLog {
            exercise_id: "deadlift".into(),
            tracking: Tracking::Weight(vec![WeightSet {
                weight: 100.0,
                unit: WeightUnit::Kg,
                reps: 1,
            }]),
        };
        let stats = stats_for(&[exercise]).unwrap();
        assert!((stats.total_volume_lbs() - 220.46).abs() < 0.01);
    }

    #[test]
    fn test_cardio_excluded_from_volume() {
        let stats = stats_for(&[weight("bench_press", &[(135.0, 10)]), cardio("run", 5000.0, 1500)])
            .unwrap();
        assert_eq!(stats.total_volume_lbs(), 1350.0);
        assert_eq!(stats.total_distance_meters(), 5000.0);
        assert_eq!(stats.total_cardio_duration_seconds, 1500);
        assert!(stats.has_cardio_exercises);
    }

    #[test]
    fn test_cardio_without_sets_still_flags() {
        let exercise = ExerciseLog {
            exercise_id: "bike".into(),
            tracking: Tracking::Cardio(vec![]),
        };
        let stats = stats_for(&[exercise]).unwrap();
        assert!(stats.has_cardio_exercises);
        assert_eq!(stats.total_sets, 0);
    }

    #[test]
    fn test_rejects_negative_values() {
        assert!(stats_for(&[weight("squat", &[(-5.0, 5)])]).is_err());
        assert!(stats_for(&[cardio("run", f64::NAN, 60)]).is_err());
    }

    #[test]
    fn test_huge_volume_rejected_not_panicking() {
        let result = stats_for(&[weight("squat", &[(1e17, 1), (1e17, 1)])]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        // A single set that cannot be represented at all
        let result = stats_for(&[weight("squat", &[(1e18, 100)])]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_combine_saturates() {
        let a = stats_for(&[weight("squat", &[(1e17, 1)])]).unwrap();
        let doubled = a.combine(a);
        assert_eq!(doubled.total_volume_centi_lbs, u64::MAX);
        assert_eq!(doubled.total_sets, 2);

        // Saturation keeps the fold order-independent
        let b = stats_for(&[weight("bench_press", &[(225.0, 5)])]).unwrap();
        assert_eq!(a.combine(a).combine(b), a.combine(b.combine(a)));
    }

    #[test]
    fn test_combine_laws() {
        let a = stats_for(&[weight("squat", &[(225.0, 5)])]).unwrap();
        let b = stats_for(&[cardio("run", 3210.5, 900)]).unwrap();
        let c = stats_for(&[weight("bench_press", &[(182.5, 7), (0.1, 3)])]).unwrap();

        assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
        assert_eq!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(WorkoutStats::ZERO), a);
        assert_eq!(WorkoutStats::ZERO.combine(a), a);
        assert_eq!(WorkoutStats::default(), WorkoutStats::ZERO);
        assert_eq!(a + b + c, [a, b, c].iter().sum());
    }

    #[test]
    fn test_week_order_independent() {
        let week = [
            stats_for(&[weight("squat", &[(315.0, 5), (315.0, 5)])]).unwrap(),
            stats_for(&[weight("bench_press", &[(225.0, 3)]), weight("deadlift", &[(405.0, 1)])])
                .unwrap(),
            stats_for(&[weight("overhead_press", &[(135.0, 5)]), cardio("row", 2000.0, 480)])
                .unwrap(),
        ];

        let expected: WorkoutStats = week.iter().sum();
        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in permutations {
            let folded = order
                .iter()
                .fold(WorkoutStats::ZERO, |acc, i| acc.combine(week[*i]));
            assert_eq!(folded, expected, "order {:?}", order);
        }

        assert!(expected.has_cardio_exercises);
        assert_eq!(
            expected.total_volume_lbs(),
            315.0 * 10.0 + 225.0 * 3.0 + 405.0 + 135.0 * 5.0
        );
        assert_eq!(expected.total_distance_meters(), 2000.0);
    }

    #[test]
    fn test_rollup_by_period() {
        // 2024-03-04 is a Monday; 03-10 is the Sunday of the same ISO week
        let workouts = vec![
            workout(4, vec![weight("squat", &[(200.0, 5)])]),
            workout(4, vec![cardio("run", 1000.0, 300)]),
            workout(10, vec![weight("bench_press", &[(100.0, 10)])]),
            workout(11, vec![weight("deadlift", &[(300.0, 3)])]),
        ];

        let by_day = rollup(&workouts, Period::Day).unwrap();
        assert_eq!(by_day.len(), 3);
        let monday = PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(by_day[&monday].total_volume_lbs(), 1000.0);
        assert!(by_day[&monday].has_cardio_exercises);

        let by_week = rollup(&workouts, Period::Week).unwrap();
        assert_eq!(by_week.len(), 2);
        let week_10 = PeriodKey::Week { year: 2024, week: 10 };
        assert_eq!(by_week[&week_10].total_volume_lbs(), 2000.0);
        assert_eq!(week_10.to_string(), "2024-W10");

        let all_time = rollup(&workouts, Period::AllTime).unwrap();
        let total = all_time[&PeriodKey::AllTime];
        assert_eq!(total, by_day.values().sum());
        assert_eq!(total, by_week.values().sum());
        assert_eq!(total.total_volume_lbs(), 2900.0);
    }
}
