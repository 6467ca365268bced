use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use liftrank_core::csv_rollup::write_rollups;
use liftrank_core::history::{lift_observations, load_workouts};
use liftrank_core::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "liftrank")]
#[command(about = "Strength percentile and tier tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a weight set and show its percentile
    Lift {
        /// Exercise id (squat, bench_press, deadlift, ...)
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// Unit of --weight; defaults to the profile unit
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,

        /// Bodyweight for this workout, in the profile unit
        #[arg(long)]
        bodyweight: Option<f64>,
    },

    /// Log a cardio set
    Cardio {
        #[arg(long)]
        exercise: String,

        /// Distance in meters
        #[arg(long, default_value_t = 0.0)]
        distance: f64,

        /// Duration in seconds
        #[arg(long, default_value_t = 0)]
        duration: u32,
    },

    /// Show the overall percentile and per-exercise breakdown
    Score {
        /// Print the overall stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show workout totals per period
    Stats {
        #[arg(long, value_enum, default_value = "week")]
        period: PeriodArg,

        /// Only include workouts from the last N days
        #[arg(long)]
        days: Option<i64>,
    },

    /// Export period rollups to CSV
    Export {
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value = "week")]
        period: PeriodArg,
    },

    /// Show the grade for a percentile
    Tier { percentile: f64 },

    /// List exercises in the benchmark table
    Exercises,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Lbs,
    Kg,
}

impl From<UnitArg> for WeightUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Lbs => WeightUnit::Lbs,
            UnitArg::Kg => WeightUnit::Kg,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Day,
    Week,
    All,
}

impl From<PeriodArg> for Period {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Day => Period::Day,
            PeriodArg::Week => Period::Week,
            PeriodArg::All => Period::AllTime,
        }
    }
}

/// Resolved file locations under the data directory
struct DataPaths {
    workouts: PathBuf,
    snapshot: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        Self {
            workouts: data_dir.join("workouts.jsonl"),
            snapshot: data_dir.join("rank.json"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    liftrank_core::logging::init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Lift {
            exercise,
            weight,
            reps,
            unit,
            bodyweight,
        } => cmd_lift(&paths, &config, exercise, weight, reps, unit, bodyweight),
        Commands::Cardio {
            exercise,
            distance,
            duration,
        } => cmd_cardio(&paths, exercise, distance, duration),
        Commands::Score { json } => cmd_score(&paths, &config, json),
        Commands::Stats { period, days } => cmd_stats(&paths, period.into(), days),
        Commands::Export { out, period } => cmd_export(&paths, &out, period.into()),
        Commands::Tier { percentile } => cmd_tier(percentile),
        Commands::Exercises => cmd_exercises(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => Err(Error::Configuration(format!(
            "config file {} not found",
            path.display()
        ))),
        None => Config::load(),
    }
}

/// Score the full history with the configured table and scoring choices
fn build_engine(paths: &DataPaths, config: &Config, profile: &Profile) -> Result<RankEngine> {
    let table = Arc::new(config.benchmarks.load_table()?);
    let workouts = load_workouts(&paths.workouts)?;
    let observations = lift_observations(&workouts, profile);
    RankEngine::from_history(table, config.scoring.clone(), &observations)
}

fn cmd_lift(
    paths: &DataPaths,
    config: &Config,
    exercise: String,
    weight: f64,
    reps: u32,
    unit: Option<UnitArg>,
    bodyweight: Option<f64>,
) -> Result<()> {
    let profile = config.profile()?;
    let unit = unit.map(WeightUnit::from).unwrap_or(profile.unit);

    let bodyweight_lbs = match bodyweight {
        Some(value) => Some(Profile::new(value, profile.unit, profile.sex)?.bodyweight_lbs()),
        None => None,
    };

    let workout = Workout {
        id: uuid::Uuid::new_v4(),
        performed_at: Utc::now(),
        bodyweight_lbs,
        exercises: vec![ExerciseLog {
            exercise_id: exercise.clone(),
            tracking: Tracking::Weight(vec![WeightSet { weight, unit, reps }]),
        }],
    };

    let mut engine = build_engine(paths, config, &profile)?;
    let snapshot = RankSnapshot::load(&paths.snapshot)?;

    // Scoring validates the set, so nothing invalid reaches the log
    let observations = workout.lift_observations(&profile);
    let outcome = engine.record_lifts(&observations)?;
    stats_for(&workout.exercises)?;
    let percentile = observations
        .first()
        .map(|observation| engine.calculator().percentile_for_observation(observation))
        .transpose()?
        .flatten();

    let mut sink = JsonlSink::new(&paths.workouts);
    sink.append(&workout)?;

    println!("✓ Logged {} {}{} x {}", exercise, weight, unit, reps);
    match percentile {
        Some(p) => println!(
            "  {}: {:.1} percentile ({})",
            exercise,
            p,
            Grade::for_percentile(p)?
        ),
        None => println!("  {}: no benchmark data", exercise),
    }
    if outcome.updated.is_empty() && percentile.is_some() {
        println!("  Not a new {}", selection_label(config.scoring.selection));
    }

    print_overall(&outcome.overall);

    if let Some(t) = snapshot.transition_to(&outcome.overall) {
        if t.is_rank_up() {
            println!("\n★ Rank up! {} → {}", t.previous_tier, t.new_tier);
        } else if t.tier_changed {
            println!("\nTier dropped: {} → {}", t.previous_tier, t.new_tier);
        }
    }

    RankSnapshot::from_stats(&outcome.overall, engine.table().version(), Utc::now())
        .save(&paths.snapshot)?;

    Ok(())
}

fn selection_label(policy: SelectionPolicy) -> &'static str {
    match policy {
        SelectionPolicy::Best => "personal best",
        SelectionPolicy::Latest => "latest result",
    }
}

fn cmd_cardio(paths: &DataPaths, exercise: String, distance: f64, duration: u32) -> Result<()> {
    let workout = Workout {
        id: uuid::Uuid::new_v4(),
        performed_at: Utc::now(),
        bodyweight_lbs: None,
        exercises: vec![ExerciseLog {
            exercise_id: exercise.clone(),
            tracking: Tracking::Cardio(vec![CardioSet {
                distance_meters: distance,
                duration_seconds: duration,
            }]),
        }],
    };

    stats_for(&workout.exercises)?;

    let mut sink = JsonlSink::new(&paths.workouts);
    sink.append(&workout)?;

    println!(
        "✓ Logged {} {:.0} m in {}",
        exercise,
        distance,
        format_duration(u64::from(duration))
    );
    Ok(())
}

fn cmd_score(paths: &DataPaths, config: &Config, json: bool) -> Result<()> {
    let profile = config.profile()?;
    let mut engine = build_engine(paths, config, &profile)?;
    let overall = engine.overall().clone();

    if json {
        println!("{}", serde_json::to_string_pretty(&overall)?);
        return Ok(());
    }

    if !overall.has_data() {
        println!("No scored lifts yet.");
        println!("Overall: 0");
        return Ok(());
    }

    print_overall(&overall);
    println!();
    for entry in overall.per_exercise.values() {
        println!(
            "  {:<16} {:>5.1}  {}  ({})",
            entry.exercise_id,
            entry.percentile,
            Grade::for_percentile(entry.percentile)?,
            entry.timestamp.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn print_overall(overall: &OverallStats) {
    match overall.grade() {
        Some(grade) => println!(
            "Overall: {} ({}, tier {})",
            overall.display_percentile(),
            grade,
            base_tier(&grade)
        ),
        None => println!("Overall: {}", overall.display_percentile()),
    }
}

fn load_period_stats(
    paths: &DataPaths,
    period: Period,
    days: Option<i64>,
) -> Result<std::collections::BTreeMap<PeriodKey, WorkoutStats>> {
    let workouts = match days {
        Some(days) => load_recent_workouts(&paths.workouts, days, Utc::now())?,
        None => load_workouts(&paths.workouts)?,
    };
    rollup(&workouts, period)
}

fn cmd_stats(paths: &DataPaths, period: Period, days: Option<i64>) -> Result<()> {
    let rollups = load_period_stats(paths, period, days)?;

    if rollups.is_empty() {
        println!("No workouts logged.");
        return Ok(());
    }

    for (key, stats) in &rollups {
        print!(
            "{}: {} sets, {} reps, {:.0} lbs volume",
            key,
            stats.total_sets,
            stats.total_reps,
            stats.total_volume_lbs()
        );
        if stats.has_cardio_exercises {
            print!(
                ", {:.0} m cardio in {}",
                stats.total_distance_meters(),
                format_duration(stats.total_cardio_duration_seconds)
            );
        }
        println!();
    }

    let total: WorkoutStats = rollups.values().sum();
    if rollups.len() > 1 {
        println!(
            "Total: {} sets, {} reps, {:.0} lbs volume",
            total.total_sets,
            total.total_reps,
            total.total_volume_lbs()
        );
    }
    Ok(())
}

fn cmd_export(paths: &DataPaths, out: &Path, period: Period) -> Result<()> {
    let rollups = load_period_stats(paths, period, None)?;
    let count = write_rollups(&rollups, out)?;

    println!("✓ Exported {} rows", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_tier(percentile: f64) -> Result<()> {
    let grade = Grade::for_percentile(percentile)?;
    let (lower, upper) = grade.tier.bounds();
    println!("{} (tier {}: {} to {})", grade, base_tier(&grade), lower, upper);
    Ok(())
}

fn cmd_exercises(config: &Config) -> Result<()> {
    let table = config.benchmarks.load_table()?;
    println!("Benchmark table {}", table.version());
    for id in table.exercise_ids() {
        if let Some(exercise) = table.exercise(id) {
            println!("  {:<16} {}", id, exercise.name);
        }
    }
    Ok(())
}

fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
