//! Tier classification from percentiles.
//!
//! The six tiers partition `[0, 100]`:
//!
//! | Tier | Range       |
//! |------|-------------|
//! | E    | `[0, 6)`    |
//! | D    | `[6, 23)`   |
//! | C    | `[23, 47)`  |
//! | B    | `[47, 70)`  |
//! | A    | `[70, 85)`  |
//! | S    | `[85, 100]` |
//!
//! Lower bounds are inclusive, so a percentile of exactly 85 is `S`, not `A`.
//! Only `S` includes its upper bound.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered strength tier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Tier {
    /// All tiers, lowest first
    pub const ALL: [Tier; 6] = [Tier::E, Tier::D, Tier::C, Tier::B, Tier::A, Tier::S];

    /// Inclusive lower and upper bound of the tier's percentile range.
    /// The upper bound is exclusive for every tier except `S`.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Tier::E => (0.0, 6.0),
            Tier::D => (6.0, 23.0),
            Tier::C => (23.0, 47.0),
            Tier::B => (47.0, 70.0),
            Tier::A => (70.0, 85.0),
            Tier::S => (85.0, 100.0),
        }
    }

    /// Classify a percentile
    ///
    /// Rejects NaN and anything outside `[0, 100]`.
    pub fn for_percentile(percentile: f64) -> Result<Tier> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(Error::invalid(format!(
                "percentile must be within [0, 100], got {}",
                percentile
            )));
        }

        // Highest tier whose inclusive lower bound is reached
        let tier = Tier::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| percentile >= tier.bounds().0)
            .unwrap_or(Tier::E);

        Ok(tier)
    }

    /// Tiers that collaborators style as "high tier"
    pub fn is_high(self) -> bool {
        matches!(self, Tier::A | Tier::S)
    }

    /// Next tier up, if any
    pub fn next(self) -> Option<Tier> {
        let idx = Tier::ALL.iter().position(|t| *t == self)?;
        Tier::ALL.get(idx + 1).copied()
    }

    pub fn letter(self) -> char {
        match self {
            Tier::E => 'E',
            Tier::D => 'D',
            Tier::C => 'C',
            Tier::B => 'B',
            Tier::A => 'A',
            Tier::S => 'S',
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(s.parse::<Grade>()?.base())
    }
}

// ============================================================================
// Display grades
// ============================================================================

/// Cosmetic sub-grade within a tier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Minus,
    Flat,
    Plus,
}

/// A tier with a display-only modifier, e.g. "S+" or "B-"
///
/// Each tier's range is split into thirds: lower third `-`, middle third
/// bare, upper third `+`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Grade {
    pub tier: Tier,
    pub modifier: Modifier,
}

impl Grade {
    pub fn for_percentile(percentile: f64) -> Result<Grade> {
        let tier = Tier::for_percentile(percentile)?;
        let (lower, upper) = tier.bounds();
        let position = (percentile - lower) / (upper - lower);

        let modifier = if position < 1.0 / 3.0 {
            Modifier::Minus
        } else if position < 2.0 / 3.0 {
            Modifier::Flat
        } else {
            Modifier::Plus
        };

        Ok(Grade { tier, modifier })
    }

    /// The canonical tier with the modifier stripped
    pub fn base(self) -> Tier {
        self.tier
    }
}

/// Strip the cosmetic modifier from a grade
pub fn base_tier(grade: &Grade) -> Tier {
    grade.base()
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Modifier::Minus => write!(f, "{}-", self.tier),
            Modifier::Flat => write!(f, "{}", self.tier),
            Modifier::Plus => write!(f, "{}+", self.tier),
        }
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| Error::invalid("empty tier label"))?;

        let tier = match letter.to_ascii_uppercase() {
            'E' => Tier::E,
            'D' => Tier::D,
            'C' => Tier::C,
            'B' => Tier::B,
            'A' => Tier::A,
            'S' => Tier::S,
            _ => return Err(Error::invalid(format!("unknown tier label '{}'", s))),
        };

        let modifier = match chars.as_str() {
            "" => Modifier::Flat,
            "+" => Modifier::Plus,
            "-" => Modifier::Minus,
            _ => return Err(Error::invalid(format!("unknown tier label '{}'", s))),
        };

        Ok(Grade { tier, modifier })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let cases = [
            (0.0, Tier::E),
            (5.999, Tier::E),
            (6.0, Tier::D),
            (22.999, Tier::D),
            (23.0, Tier::C),
            (46.999, Tier::C),
            (47.0, Tier::B),
            (69.999, Tier::B),
            (70.0, Tier::A),
            (84.999, Tier::A),
            (85.0, Tier::S),
            (100.0, Tier::S),
        ];

        for (p, expected) in cases {
            assert_eq!(Tier::for_percentile(p).unwrap(), expected, "percentile {}", p);
        }
    }

    #[test]
    fn test_ranges_partition_zero_to_hundred() {
        // Every sampled percentile lands in exactly one tier's range
        let mut p = 0.0;
        while p <= 100.0 {
            let containing: Vec<_> = Tier::ALL
                .iter()
                .filter(|t| {
                    let (lo, hi) = t.bounds();
                    p >= lo && (p < hi || (**t == Tier::S && p <= hi))
                })
                .collect();
            assert_eq!(containing.len(), 1, "percentile {} in {:?}", p, containing);
            assert_eq!(*containing[0], Tier::for_percentile(p).unwrap());
            p += 0.25;
        }

        // Adjacent ranges share their boundary with no gap
        for pair in Tier::ALL.windows(2) {
            assert_eq!(pair[0].bounds().1, pair[1].bounds().0);
        }
        assert_eq!(Tier::E.bounds().0, 0.0);
        assert_eq!(Tier::S.bounds().1, 100.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Tier::for_percentile(-0.001).is_err());
        assert!(Tier::for_percentile(100.001).is_err());
        assert!(Tier::for_percentile(f64::NAN).is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::E < Tier::D);
        assert!(Tier::A < Tier::S);
        assert_eq!(Tier::B.next(), Some(Tier::A));
        assert_eq!(Tier::S.next(), None);
        assert!(Tier::S.is_high());
        assert!(Tier::A.is_high());
        assert!(!Tier::B.is_high());
    }

    #[test]
    fn test_grades() {
        assert_eq!(Grade::for_percentile(85.0).unwrap().to_string(), "S-");
        assert_eq!(Grade::for_percentile(92.0).unwrap().to_string(), "S");
        assert_eq!(Grade::for_percentile(100.0).unwrap().to_string(), "S+");
        assert_eq!(Grade::for_percentile(3.0).unwrap().to_string(), "E");
        assert_eq!(Grade::for_percentile(68.0).unwrap().to_string(), "B+");
    }

    #[test]
    fn test_base_tier_strips_modifier() {
        let plus: Grade = "S+".parse().unwrap();
        let minus: Grade = "s-".parse().unwrap();
        assert_eq!(base_tier(&plus), Tier::S);
        assert_eq!(base_tier(&minus), Tier::S);
        assert_eq!("A".parse::<Tier>().unwrap(), Tier::A);
        assert_eq!("B+".parse::<Tier>().unwrap(), Tier::B);
        assert!("Z".parse::<Grade>().is_err());
        assert!("S++".parse::<Grade>().is_err());
        assert!("".parse::<Grade>().is_err());
    }
}
