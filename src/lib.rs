#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use analysis::{LevelGenerator, LevelParams, Tolerance, compute_levels};
pub use data::{BarSeriesCollection, fetch_bar_data};
pub use domain::{Bar, LevelError, SymbolInterval};
pub use models::{BarSeries, GlobalLevels, Level, LevelMode, LevelResult, LevelSide};

// CLI argument parsing
use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

use crate::config::ANALYSIS;
use crate::models::Representative;
use crate::utils::TimeUtils;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fractal support and resistance levels", long_about = None)]
pub struct Cli {
    /// Twelve Data `time_series` JSON files to read
    #[arg(long, short)]
    pub input: Vec<PathBuf>,

    /// Only report this symbol (case-insensitive)
    #[arg(long, short)]
    pub symbol: Option<String>,

    /// Bar interval name, e.g. 1h, 1day, 1week
    #[arg(long, default_value = "1day")]
    pub interval: String,

    /// Number of most recent bars to analyse
    #[arg(long, default_value_t = ANALYSIS.periods.default)]
    pub periods: usize,

    /// Bars on each side a fractal must beat
    #[arg(long, short, default_value_t = ANALYSIS.fractals.default_window)]
    pub window: usize,

    /// Clustering tolerance as a percent of the latest close
    #[arg(long, conflicts_with = "tolerance_abs")]
    pub tolerance_pct: Option<f64>,

    /// Clustering tolerance in price units
    #[arg(long)]
    pub tolerance_abs: Option<f64>,

    /// Report cluster medians instead of means
    #[arg(long, default_value_t = false)]
    pub median: bool,

    #[arg(long, value_enum, default_value_t = LevelMode::All)]
    pub mode: LevelMode,

    /// Print JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Use the local cache ahead of the input files
    #[arg(long, default_value_t = false)]
    pub prefer_cache: bool,
}

impl Cli {
    pub fn interval_ms(&self) -> Result<i64> {
        TimeUtils::interval_from_str(&self.interval)
            .ok_or_else(|| anyhow!("Unknown interval {:?}", self.interval))
    }

    /// Checks `--periods` against the configured bounds
    pub fn periods(&self) -> Result<usize> {
        let bounds = ANALYSIS.periods.min..=ANALYSIS.periods.max;
        if bounds.contains(&self.periods) {
            Ok(self.periods)
        } else {
            Err(anyhow!(
                "--periods must be between {} and {}, got {}",
                bounds.start(),
                bounds.end(),
                self.periods
            ))
        }
    }

    pub fn level_params(&self) -> LevelParams {
        let tolerance = match (self.tolerance_abs, self.tolerance_pct) {
            (Some(abs), _) => Tolerance::Absolute(abs),
            (None, Some(pct)) => Tolerance::Percent(pct),
            (None, None) => Tolerance::default(),
        };
        LevelParams {
            window: self.window,
            tolerance,
            representative: if self.median {
                Representative::Median
            } else {
                Representative::Mean
            },
            mode: self.mode,
        }
    }
}
