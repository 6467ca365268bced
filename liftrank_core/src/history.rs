//! Workout history loading.
//!
//! Loads workouts from the log, deduplicated by id and sorted newest first,
//! and derives the lift observations the percentile engine consumes.

use crate::{Error, LiftObservation, Profile, Result, Workout};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Load every workout in the log, newest first
///
/// A workout id that appears more than once keeps its first occurrence.
pub fn load_workouts(log_path: &Path) -> Result<Vec<Workout>> {
    let mut seen_ids = HashSet::new();
    let mut workouts: Vec<Workout> = crate::wal::read_workouts(log_path)?
        .into_iter()
        .filter(|workout| seen_ids.insert(workout.id))
        .collect();

    workouts.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
    Ok(workouts)
}

/// Load workouts performed within the last `days` days of `now`, newest first
///
/// `days` must be non-negative and the cutoff must be a representable date.
pub fn load_recent_workouts(
    log_path: &Path,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Workout>> {
    let cutoff = cutoff_for(days, now)?;
    let workouts: Vec<Workout> = load_workouts(log_path)?
        .into_iter()
        .filter(|workout| workout.performed_at >= cutoff)
        .collect();

    tracing::info!(
        "Loaded {} workouts from last {} days",
        workouts.len(),
        days
    );
    Ok(workouts)
}

fn cutoff_for(days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if days < 0 {
        return Err(Error::InvalidInput(format!(
            "days must be non-negative, got {}",
            days
        )));
    }
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::InvalidInput(format!("{} days reaches past the earliest date", days)))
}

/// Flatten workouts into lift observations for scoring
pub fn lift_observations(workouts: &[Workout], profile: &Profile) -> Vec<LiftObservation> {
    workouts
        .iter()
        .flat_map(|workout| workout.lift_observations(profile))
        .collect()
}
