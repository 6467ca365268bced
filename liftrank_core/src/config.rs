//! Configuration file support for LiftRank.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftrank/config.toml`.

use crate::benchmark::{builtin_table, BenchmarkTable};
use crate::overall::Weighting;
use crate::percentile::{MaxEstimator, SelectionPolicy};
use crate::{Error, Profile, Result, Sex, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub benchmarks: BenchmarkConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Profile store values
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    #[serde(default = "default_bodyweight")]
    pub bodyweight: f64,

    #[serde(default)]
    pub unit: WeightUnit,

    #[serde(default = "default_sex")]
    pub sex: Sex,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            bodyweight: default_bodyweight(),
            unit: WeightUnit::default(),
            sex: default_sex(),
        }
    }
}

/// Scoring choices that are configuration rather than code
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoringConfig {
    #[serde(default)]
    pub estimator: MaxEstimator,

    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default)]
    pub weighting: Weighting,
}

/// Benchmark dataset location; the built-in table is used when unset
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl BenchmarkConfig {
    /// Load the configured table, or clone the built-in one
    pub fn load_table(&self) -> Result<BenchmarkTable> {
        match &self.path {
            Some(path) => BenchmarkTable::load(path),
            None => Ok(builtin_table().clone()),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("liftrank")
}

fn default_bodyweight() -> f64 {
    180.0
}

fn default_sex() -> Sex {
    Sex::Male
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.scoring.weighting.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftrank").join("config.toml")
    }

    /// Validated profile from the configured values
    pub fn profile(&self) -> Result<Profile> {
        Profile::new(self.profile.bodyweight, self.profile.unit, self.profile.sex)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
