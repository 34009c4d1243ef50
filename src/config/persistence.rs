//! File persistence and serialization configuration

use crate::utils::TimeUtils;

pub struct BarCacheConfig {
    /// Directory path for storing bar data
    pub directory: &'static str,
    /// Base filename for bar cache files (without extension)
    pub filename_base: &'static str,
    /// Current version of the cache serialization format
    pub version: f64,
    /// Maximum age of a cache file before it is considered stale (seconds)
    pub acceptable_age_secs: i64,
}

pub struct PersistenceConfig {
    pub bars: BarCacheConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    bars: BarCacheConfig {
        directory: "bar_data",
        filename_base: "bars",
        version: 1.0,
        // 24 hours (60 * 60 * 24)
        acceptable_age_secs: 86_400,
    },
};

/// Generate interval-specific cache filename
/// Example: "bars_1day_v1.bin"
pub fn bar_cache_filename(interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    format!(
        "{}_{}_v{}.bin",
        PERSISTENCE.bars.filename_base, interval_str, PERSISTENCE.bars.version
    )
}
