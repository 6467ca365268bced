//! Tier transition detection.
//!
//! Classifies a move between two overall percentiles. Only a change of base
//! tier counts; cosmetic sub-grade shifts ("A-" to "A+") do not. Deciding when
//! to check (e.g. after a new personal record is saved) is up to the caller.

use crate::overall::OverallStats;
use crate::tier::{base_tier, Grade, Tier};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a tier move
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

/// Result of comparing two percentiles
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierTransition {
    pub previous_tier: Tier,
    pub new_tier: Tier,
    pub tier_changed: bool,
}

impl TierTransition {
    pub fn direction(&self) -> Direction {
        match self.new_tier.cmp(&self.previous_tier) {
            Ordering::Greater => Direction::Up,
            Ordering::Less => Direction::Down,
            Ordering::Equal => Direction::Unchanged,
        }
    }

    /// A base-tier increase, the event that drives the celebration overlay
    pub fn is_rank_up(&self) -> bool {
        self.tier_changed && self.direction() == Direction::Up
    }
}

/// Compare two percentiles in `[0, 100]`
pub fn transition(previous_percentile: f64, new_percentile: f64) -> Result<TierTransition> {
    let previous = Grade::for_percentile(previous_percentile)?;
    let new = Grade::for_percentile(new_percentile)?;

    let previous_tier = base_tier(&previous);
    let new_tier = base_tier(&new);

    Ok(TierTransition {
        previous_tier,
        new_tier,
        tier_changed: previous_tier != new_tier,
    })
}

/// Compare two overall results; `None` when either side has no data
///
/// Going from no data to a first score is not a tier transition, since the
/// no-data tier is display-only.
pub fn transition_between(previous: &OverallStats, new: &OverallStats) -> Option<TierTransition> {
    let previous = previous.overall_percentile?;
    let new = new.overall_percentile?;
    transition(previous, new).ok()
}
