use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::fractal::FractalKind;
use crate::utils::maths_utils::{mean, median};

/// Which side of the market a level sits on
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
pub enum LevelSide {
    Support,    // Cluster of LOW fractals
    Resistance, // Cluster of HIGH fractals
}

impl From<FractalKind> for LevelSide {
    fn from(kind: FractalKind) -> Self {
        match kind {
            FractalKind::High => LevelSide::Resistance,
            FractalKind::Low => LevelSide::Support,
        }
    }
}

/// How a level's single price is derived from its member prices
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub enum Representative {
    #[default]
    Mean,
    Median,
}

impl Representative {
    pub fn of(self, prices: &[f64]) -> f64 {
        match self {
            Representative::Mean => mean(prices),
            Representative::Median => median(prices),
        }
    }
}

/// A clustered price level.
/// `strength == member_prices.len()` and `member_prices` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub side: LevelSide,
    pub strength: usize,
    /// Ascending
    pub member_prices: Vec<f64>,
    /// Bar index of the fractal behind each member price (same order)
    pub member_indices: Vec<usize>,
}

impl Level {
    /// Distance from price to the level
    pub fn distance_to(&self, price: f64) -> f64 {
        (self.price - price).abs()
    }

    /// Oldest bar that touched this level. Renderers draw the line from here.
    pub fn first_index(&self) -> Option<usize> {
        self.member_indices.iter().min().copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.member_indices.iter().max().copied()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:<10} {:>12.4}  strength {}",
            self.side, self.price, self.strength
        )
    }
}

/// One level per side, either of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalLevels {
    pub strongest_support: Option<Level>,
    pub strongest_resistance: Option<Level>,
}

/// Which selection the caller wants
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum LevelMode {
    /// Every level, strongest first
    #[default]
    All,
    /// Strongest support and strongest resistance
    Global,
    /// Lowest support and highest resistance, regardless of strength
    Extreme,
}

impl fmt::Display for LevelMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LevelMode::All => write!(f, "All levels"),
            LevelMode::Global => write!(f, "Global (strongest per side)"),
            LevelMode::Extreme => write!(f, "Extreme (outermost per side)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelResult {
    All(Vec<Level>),
    Global(GlobalLevels),
    Extreme(GlobalLevels),
}

impl LevelResult {
    /// Flattens any mode into the list of levels it carries
    pub fn levels(&self) -> Vec<&Level> {
        match self {
            LevelResult::All(levels) => levels.iter().collect(),
            LevelResult::Global(pair) | LevelResult::Extreme(pair) => pair
                .strongest_support
                .iter()
                .chain(pair.strongest_resistance.iter())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels().is_empty()
    }
}
