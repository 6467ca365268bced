//! Rank snapshot persistence with file locking.
//!
//! Stores the last overall result shown to the user so a later run can tell
//! whether the tier changed in between. The snapshot is a display record,
//! not a source of truth: overall stats are always recomputed from history.

use crate::overall::OverallStats;
use crate::tier::Tier;
use crate::transition::{transition, TierTransition};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Last overall result presented to the user
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct RankSnapshot {
    pub overall_percentile: Option<f64>,
    pub tier: Option<Tier>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Benchmark table version the snapshot was scored against
    #[serde(default)]
    pub benchmark_version: Option<String>,
}

impl RankSnapshot {
    pub fn from_stats(stats: &OverallStats, benchmark_version: &str, now: DateTime<Utc>) -> Self {
        Self {
            overall_percentile: stats.overall_percentile,
            tier: stats.overall_percentile.map(|_| stats.strength_level),
            updated_at: Some(now),
            benchmark_version: Some(benchmark_version.to_string()),
        }
    }

    /// Transition from this snapshot to `current`
    ///
    /// `None` when either side has no data.
    pub fn transition_to(&self, current: &OverallStats) -> Option<TierTransition> {
        let previous = self.overall_percentile?;
        let new = current.overall_percentile?;
        transition(previous, new).ok()
    }

    /// Load a snapshot, falling back to the default
    ///
    /// A missing file is a fresh start. An unreadable or unparsable one is
    /// logged and replaced by the default on the next save.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No rank snapshot found, starting fresh");
            return Ok(Self::default());
        }

        let parsed = read_shared(path)
            .map_err(Error::from)
            .and_then(|contents| serde_json::from_str::<RankSnapshot>(&contents).map_err(Error::from));

        match parsed {
            Ok(snapshot) => {
                tracing::debug!("Loaded rank snapshot from {:?}", path);
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Ignoring rank snapshot {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the snapshot with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("snapshot path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved rank snapshot to {:?}", path);
        Ok(())
    }
}

/// Read a whole file under a shared lock
fn read_shared(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    file.lock_shared()?;
    let mut contents = String::new();
    let read = file.read_to_string(&mut contents);
    file.unlock()?;
    read.map(|_| contents)
}
