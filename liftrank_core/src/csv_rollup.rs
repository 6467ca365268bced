//! CSV export of workout rollups.
//!
//! Rollups are written to a temp file in the target directory, synced, and
//! renamed over the destination so readers never see a partial export.

use crate::workout_stats::{PeriodKey, WorkoutStats};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct RollupRow {
    pub period: String,
    pub total_sets: u64,
    pub total_reps: u64,
    pub total_volume_lbs: f64,
    pub has_cardio: bool,
    pub total_distance_m: f64,
    pub total_cardio_duration_s: u64,
}

impl RollupRow {
    pub fn new(key: &PeriodKey, stats: &WorkoutStats) -> Self {
        RollupRow {
            period: key.to_string(),
            total_sets: stats.total_sets,
            total_reps: stats.total_reps,
            total_volume_lbs: stats.total_volume_lbs(),
            has_cardio: stats.has_cardio_exercises,
            total_distance_m: stats.total_distance_meters(),
            total_cardio_duration_s: stats.total_cardio_duration_seconds,
        }
    }
}

/// Write rollups to `csv_path`, replacing any previous export
///
/// Returns the number of rows written.
pub fn write_rollups(rollups: &BTreeMap<PeriodKey, WorkoutStats>, csv_path: &Path) -> Result<usize> {
    let parent = match csv_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());

        for (key, stats) in rollups {
            writer.serialize(RollupRow::new(key, stats))?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote {} rollup rows to {:?}", rollups.len(), csv_path);
    Ok(rollups.len())
}

/// Read an exported rollup file back
pub fn read_rollups(csv_path: &Path) -> Result<Vec<RollupRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RollupRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stats(volume_lbs: u64, cardio: bool) -> WorkoutStats {
        WorkoutStats {
            total_sets: 3,
            total_reps: 15,
            total_volume_centi_lbs: volume_lbs * 100,
            has_cardio_exercises: cardio,
            total_distance_mm: if cardio { 5_000_000 } else { 0 },
            total_cardio_duration_seconds: if cardio { 1500 } else { 0 },
        }
    }

    fn day(d: u32) -> PeriodKey {
        PeriodKey::Day(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    #[test]
    fn test_write_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("exports").join("daily.csv");

        let rollups = BTreeMap::from([(day(4), stats(3375, false)), (day(5), stats(0, true))]);
        let count = write_rollups(&rollups, &csv_path).unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("period,total_sets,total_reps,total_volume_lbs"));
        assert!(content.contains("2024-03-04"));

        let rows = read_rollups(&csv_path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total_volume_lbs, 3375.0);
        assert!(rows[1].has_cardio);
        assert_eq!(rows[1].total_distance_m, 5000.0);
    }

    #[test]
    fn test_write_replaces_previous_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("weekly.csv");

        let first = BTreeMap::from([(day(4), stats(100, false)), (day(5), stats(200, false))]);
        write_rollups(&first, &csv_path).unwrap();

        let second = BTreeMap::from([(PeriodKey::AllTime, stats(300, true))]);
        write_rollups(&second, &csv_path).unwrap();

        let rows = read_rollups(&csv_path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, "all-time");

        // No stray temp files remain next to the export
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_empty_rollups_write_no_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("empty.csv");

        assert_eq!(write_rollups(&BTreeMap::new(), &csv_path).unwrap(), 0);
        assert!(read_rollups(&csv_path).unwrap().is_empty());
    }
}
