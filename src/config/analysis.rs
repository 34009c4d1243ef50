//! Analysis and computation configuration

use crate::utils::TimeUtils;

/// Limits for the "number of periods" selector
pub struct PeriodsConfig {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

/// Fractal detection settings
pub struct FractalSettings {
    // Bars compared on each side of a candidate. Larger finds fewer, more significant fractals
    pub default_window: usize,
    // Smallest window accepted at the compute_levels boundary
    pub min_window: usize,
}

/// Level clustering settings
pub struct LevelSettings {
    // Default clustering tolerance as a percentage of the latest close
    // 0.5 corresponds to 0.5% of the price
    pub default_tolerance_pct: f64,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    // Bar interval used when the input does not say otherwise
    pub default_interval_ms: i64,

    // Sub-groups
    pub periods: PeriodsConfig,
    pub fractals: FractalSettings,
    pub levels: LevelSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    default_interval_ms: TimeUtils::MS_IN_D,

    periods: PeriodsConfig {
        min: 5,
        max: 200,
        default: 40,
    },

    fractals: FractalSettings {
        default_window: 2,
        min_window: 2,
    },

    levels: LevelSettings {
        default_tolerance_pct: 0.5,
    },
};
