//! Population benchmark curves.
//!
//! A [`BenchmarkTable`] maps `(exercise, sex)` to a [`BenchmarkCurve`] of
//! `(percentile, relative strength)` control points. Tables are versioned,
//! read-only configuration: either the built-in table or a TOML file.
//!
//! A missing exercise or an unsupported schema version is "no data", never
//! fatal. A curve that breaks the ordering invariants is a configuration
//! error at load time.

use crate::{Error, Result, Sex};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Benchmark file schema this build understands
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// How an exercise's performance is normalized before lookup
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Estimated max divided by bodyweight
    #[default]
    Relative,
    /// Estimated max in pounds, not bodyweight-normalized
    Absolute,
}

/// How a percentile is read off between two control points
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Piecewise-linear between bracketing points
    #[default]
    Linear,
    /// Percentile of the highest control point not above the input
    Step,
}

/// One control point on a benchmark curve
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub percentile: f64,
    pub relative_strength: f64,
}

/// Reference curve for one exercise and sex
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkCurve {
    exercise_id: String,
    sex: Sex,
    points: Vec<CurvePoint>,
}

impl BenchmarkCurve {
    /// Build a validated curve
    pub fn new(exercise_id: impl Into<String>, sex: Sex, points: Vec<CurvePoint>) -> Result<Self> {
        let curve = Self {
            exercise_id: exercise_id.into(),
            sex,
            points,
        };
        let errors = curve.validate();
        if !errors.is_empty() {
            return Err(Error::config(errors.join("; ")));
        }
        Ok(curve)
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Check the curve invariants
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let label = format!("{}/{}", self.exercise_id, self.sex);

        if self.points.len() < 2 {
            errors.push(format!(
                "Curve '{}' needs at least 2 control points, has {}",
                label,
                self.points.len()
            ));
        }

        for point in &self.points {
            if !point.percentile.is_finite() || !(0.0..=100.0).contains(&point.percentile) {
                errors.push(format!(
                    "Curve '{}': percentile {} outside [0, 100]",
                    label, point.percentile
                ));
            }
            if !point.relative_strength.is_finite() || point.relative_strength < 0.0 {
                errors.push(format!(
                    "Curve '{}': invalid relative strength {}",
                    label, point.relative_strength
                ));
            }
        }

        for pair in self.points.windows(2) {
            if pair[1].percentile <= pair[0].percentile {
                errors.push(format!(
                    "Curve '{}': percentiles not strictly ascending ({} then {})",
                    label, pair[0].percentile, pair[1].percentile
                ));
            }
            if pair[1].relative_strength < pair[0].relative_strength {
                errors.push(format!(
                    "Curve '{}': relative strength decreases ({} then {})",
                    label, pair[0].relative_strength, pair[1].relative_strength
                ));
            }
        }

        errors
    }

    /// Read the percentile for a relative strength value
    ///
    /// Below the first control point → 0, above the last → 100. Within a flat
    /// run of equal relative strength the highest percentile of the run wins,
    /// which keeps the mapping non-decreasing.
    pub fn percentile_at(&self, relative_strength: f64, interpolation: Interpolation) -> f64 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0.0;
        };

        if relative_strength < first.relative_strength {
            return 0.0;
        }
        if relative_strength > last.relative_strength {
            return 100.0;
        }

        let Some(idx) = self
            .points
            .iter()
            .rposition(|p| p.relative_strength <= relative_strength)
        else {
            return 0.0;
        };

        let lo = self.points[idx];
        let Some(hi) = self.points.get(idx + 1) else {
            return lo.percentile;
        };

        let percentile = match interpolation {
            Interpolation::Step => lo.percentile,
            Interpolation::Linear => {
                let span = hi.relative_strength - lo.relative_strength;
                let t = (relative_strength - lo.relative_strength) / span;
                // Rounding must not overshoot the next control point
                (lo.percentile + (hi.percentile - lo.percentile) * t).min(hi.percentile)
            }
        };

        percentile.clamp(0.0, 100.0)
    }
}

/// All curves for one exercise
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseBenchmark {
    pub id: String,
    pub name: String,
    pub scale: Scale,
    pub curves: HashMap<Sex, BenchmarkCurve>,
}

/// Versioned set of benchmark curves
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkTable {
    version: String,
    interpolation: Interpolation,
    exercises: HashMap<String, ExerciseBenchmark>,
}

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Deserialize)]
struct BenchmarkFile {
    schema_version: u32,
    version: String,
    #[serde(default)]
    interpolation: Interpolation,
    #[serde(default)]
    exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Deserialize)]
struct ExerciseEntry {
    id: String,
    name: Option<String>,
    #[serde(default)]
    scale: Scale,
    curves: Vec<CurveEntry>,
}

#[derive(Debug, Deserialize)]
struct CurveEntry {
    sex: Sex,
    points: Vec<[f64; 2]>,
}

impl BenchmarkTable {
    /// A table with no curves; every lookup is "no data"
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            interpolation: Interpolation::default(),
            exercises: HashMap::new(),
        }
    }

    /// Parse a benchmark table from TOML
    ///
    /// An unsupported `schema_version` yields an empty table with a warning.
    /// Malformed documents and invalid curves are configuration errors.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: BenchmarkFile = toml::from_str(contents)
            .map_err(|e| Error::config(format!("Malformed benchmark table: {}", e)))?;

        if file.schema_version != SUPPORTED_SCHEMA_VERSION {
            tracing::warn!(
                "Unsupported benchmark schema version {} (table '{}'), treating as no data",
                file.schema_version,
                file.version
            );
            return Ok(Self::empty(file.version));
        }

        let mut table = Self {
            version: file.version,
            interpolation: file.interpolation,
            exercises: HashMap::new(),
        };

        for entry in file.exercises {
            if table.exercises.contains_key(&entry.id) {
                return Err(Error::config(format!(
                    "Duplicate exercise '{}' in benchmark table",
                    entry.id
                )));
            }

            let mut curves = HashMap::new();
            for curve in entry.curves {
                let points = curve
                    .points
                    .iter()
                    .map(|[percentile, relative_strength]| CurvePoint {
                        percentile: *percentile,
                        relative_strength: *relative_strength,
                    })
                    .collect();
                let curve = BenchmarkCurve::new(entry.id.clone(), curve.sex, points)?;
                if curves.insert(curve.sex, curve).is_some() {
                    return Err(Error::config(format!(
                        "Duplicate curve for exercise '{}'",
                        entry.id
                    )));
                }
            }

            table.exercises.insert(
                entry.id.clone(),
                ExerciseBenchmark {
                    name: entry.name.unwrap_or_else(|| entry.id.clone()),
                    id: entry.id,
                    scale: entry.scale,
                    curves,
                },
            );
        }

        tracing::info!(
            "Loaded benchmark table '{}' with {} exercises",
            table.version,
            table.exercises.len()
        );
        Ok(table)
    }

    /// Load a benchmark table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Unable to read benchmark table {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&ExerciseBenchmark> {
        self.exercises.get(exercise_id)
    }

    /// Curve for an exercise and sex, if the table has one
    pub fn curve(&self, exercise_id: &str, sex: Sex) -> Option<&BenchmarkCurve> {
        self.exercises.get(exercise_id)?.curves.get(&sex)
    }

    /// Exercise ids in sorted order
    pub fn exercise_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.exercises.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Validate every curve in the table
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (id, exercise) in &self.exercises {
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.curves.is_empty() {
                errors.push(format!("Exercise '{}' has no curves", id));
            }
            for (sex, curve) in &exercise.curves {
                if *sex != curve.sex || curve.exercise_id != exercise.id {
                    errors.push(format!("Curve key mismatch for '{}'/{}", id, sex));
                }
                errors.extend(curve.validate());
            }
        }
        errors
    }
}

// ============================================================================
// Built-in table
// ============================================================================

/// Version tag of the bundled benchmark table
pub const BUILTIN_VERSION: &str = "builtin-2024.1";

/// Cached built-in table, built once and shared read-only
static BUILTIN_TABLE: Lazy<BenchmarkTable> = Lazy::new(build_builtin_table);

/// Get a reference to the bundled benchmark table
pub fn builtin_table() -> &'static BenchmarkTable {
    &BUILTIN_TABLE
}

// Percentile anchors shared by every built-in curve: the tier boundaries plus
// both ends of the scale.
const ANCHORS: [f64; 7] = [0.0, 6.0, 23.0, 47.0, 70.0, 85.0, 100.0];

fn builtin_curve(exercise_id: &str, sex: Sex, strengths: [f64; 7]) -> (Sex, BenchmarkCurve) {
    let points = ANCHORS
        .iter()
        .zip(strengths)
        .map(|(percentile, relative_strength)| CurvePoint {
            percentile: *percentile,
            relative_strength,
        })
        .collect();

    (
        sex,
        BenchmarkCurve {
            exercise_id: exercise_id.into(),
            sex,
            points,
        },
    )
}

fn builtin_exercise(
    id: &str,
    name: &str,
    scale: Scale,
    male: [f64; 7],
    female: [f64; 7],
) -> (String, ExerciseBenchmark) {
    (
        id.into(),
        ExerciseBenchmark {
            id: id.into(),
            name: name.into(),
            scale,
            curves: HashMap::from([
                builtin_curve(id, Sex::Male, male),
                builtin_curve(id, Sex::Female, female),
            ]),
        },
    )
}

fn build_builtin_table() -> BenchmarkTable {
    let exercises = HashMap::from([
        // Bodyweight multiples of estimated 1RM
        builtin_exercise(
            "squat",
            "Back Squat",
            Scale::Relative,
            [0.50, 0.75, 1.00, 1.35, 1.65, 1.95, 2.75],
            [0.30, 0.50, 0.75, 1.00, 1.25, 1.50, 2.20],
        ),
        builtin_exercise(
            "bench_press",
            "Bench Press",
            Scale::Relative,
            [0.35, 0.55, 0.75, 1.00, 1.25, 1.50, 2.10],
            [0.20, 0.30, 0.45, 0.60, 0.80, 0.95, 1.45],
        ),
        builtin_exercise(
            "deadlift",
            "Deadlift",
            Scale::Relative,
            [0.60, 0.95, 1.25, 1.60, 1.95, 2.30, 3.10],
            [0.40, 0.65, 0.95, 1.25, 1.55, 1.85, 2.60],
        ),
        builtin_exercise(
            "overhead_press",
            "Overhead Press",
            Scale::Relative,
            [0.25, 0.40, 0.50, 0.65, 0.80, 0.95, 1.35],
            [0.15, 0.25, 0.33, 0.43, 0.55, 0.67, 0.95],
        ),
        // Total load in pounds
        builtin_exercise(
            "farmers_walk",
            "Farmer's Walk",
            Scale::Absolute,
            [50.0, 90.0, 140.0, 200.0, 260.0, 320.0, 450.0],
            [30.0, 50.0, 80.0, 120.0, 160.0, 200.0, 300.0],
        ),
    ]);

    BenchmarkTable {
        version: BUILTIN_VERSION.into(),
        interpolation: Interpolation::Linear,
        exercises,
    }
}
