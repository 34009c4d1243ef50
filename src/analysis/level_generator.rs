use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::fractal_detector::detect;
use crate::analysis::level_aggregator::aggregate_with;
use crate::analysis::level_selector::{select_all, select_extreme, select_global};
use crate::config::ANALYSIS;
use crate::data::timeseries::BarSeriesCollection;
use crate::domain::{LevelError, SymbolInterval};
use crate::models::{BarSeries, LevelMode, LevelResult, Representative};
use crate::utils::maths_utils::pct_of;

#[allow(unused_imports)]
use crate::config::DEBUG_FLAGS;

/// Maximum gap between two fractal prices that may share a level
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Tolerance {
    /// Fixed price distance
    Absolute(f64),
    /// Percentage of the series' latest close (0.5 = 0.5%)
    Percent(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Percent(ANALYSIS.levels.default_tolerance_pct)
    }
}

impl Tolerance {
    /// Absolute price distance for a series whose latest close is `last_close`
    pub fn resolve(self, last_close: f64) -> Result<f64, LevelError> {
        let (raw, resolved) = match self {
            Tolerance::Absolute(value) => (value, value),
            Tolerance::Percent(pct) => (pct, pct_of(last_close, pct)),
        };
        if !raw.is_finite() || raw <= 0.0 || !resolved.is_finite() || resolved <= 0.0 {
            return Err(LevelError::InvalidTolerance(raw));
        }
        Ok(resolved)
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LevelParams {
    pub window: usize,
    pub tolerance: Tolerance,
    pub representative: Representative,
    pub mode: LevelMode,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            window: ANALYSIS.fractals.default_window,
            tolerance: Tolerance::default(),
            representative: Representative::default(),
            mode: LevelMode::default(),
        }
    }
}

impl LevelParams {
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.window < ANALYSIS.fractals.min_window {
            return Err(LevelError::InvalidWindow {
                window: self.window,
                min: ANALYSIS.fractals.min_window,
            });
        }
        match self.tolerance {
            Tolerance::Absolute(v) | Tolerance::Percent(v) if !v.is_finite() || v <= 0.0 => {
                Err(LevelError::InvalidTolerance(v))
            }
            _ => Ok(()),
        }
    }
}

/// Full pipeline: detect fractals, cluster them, select per `params.mode`.
///
/// Parameters are checked before the series, and the series is checked in
/// full before any detection runs. Pure: the same inputs always produce the
/// same result.
pub fn compute_levels(series: &BarSeries, params: &LevelParams) -> Result<LevelResult, LevelError> {
    params.validate()?;
    series.validate()?;

    let last_close = series.last_close().ok_or(LevelError::EmptySeries)?;
    let tolerance = params.tolerance.resolve(last_close)?;

    let fractals = detect(series, params.window)?;
    let levels = aggregate_with(&fractals, tolerance, params.representative)?;

    let result = match params.mode {
        LevelMode::All => LevelResult::All(select_all(&levels)),
        LevelMode::Global => LevelResult::Global(select_global(&levels, last_close)),
        LevelMode::Extreme => LevelResult::Extreme(select_extreme(&levels)),
    };

    log::debug!(
        "{}: {} bars → {} fractals → {} levels (tolerance {:.4})",
        series.symbol_interval,
        series.len(),
        fractals.len(),
        levels.len(),
        tolerance
    );

    Ok(result)
}

// --- The cache key struct ---
#[derive(Clone, Debug)]
struct CacheKey {
    symbol_interval: SymbolInterval,
    window: usize,
    tolerance: Tolerance,
    representative: Representative,
    mode: LevelMode,
    /// A new bar changes this, so stale entries are never hit
    last_timestamp_ms: i64,
    bar_count: usize,
}

impl CacheKey {
    fn new(series: &BarSeries, params: &LevelParams) -> Self {
        Self {
            symbol_interval: series.symbol_interval.clone(),
            window: params.window,
            tolerance: params.tolerance,
            representative: params.representative,
            mode: params.mode,
            last_timestamp_ms: series.last_timestamp_ms().unwrap_or(i64::MIN),
            bar_count: series.len(),
        }
    }

    fn tolerance_bits(&self) -> (u8, u64) {
        match self.tolerance {
            Tolerance::Absolute(v) => (0, v.to_bits()),
            Tolerance::Percent(v) => (1, v.to_bits()),
        }
    }
}

impl Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol_interval.hash(state);
        self.window.hash(state);
        self.tolerance_bits().hash(state);
        self.representative.hash(state);
        self.mode.hash(state);
        self.last_timestamp_ms.hash(state);
        self.bar_count.hash(state);
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.symbol_interval == other.symbol_interval
            && self.window == other.window
            && self.tolerance_bits() == other.tolerance_bits()
            && self.representative == other.representative
            && self.mode == other.mode
            && self.last_timestamp_ms == other.last_timestamp_ms
            && self.bar_count == other.bar_count
    }
}

impl Eq for CacheKey {}

/// Memoizing front end for `compute_levels`. The cache belongs to the caller;
/// the pipeline underneath is stateless.
pub struct LevelGenerator {
    cache: Arc<Mutex<HashMap<CacheKey, Arc<LevelResult>>>>,
}

impl Default for LevelGenerator {
    fn default() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Clone for LevelGenerator {
    fn clone(&self) -> Self {
        Self {
            // Clone the Arc, not the HashMap - this shares the cache!
            cache: Arc::clone(&self.cache),
        }
    }
}

impl LevelGenerator {
    pub fn get_levels(
        &self,
        series: &BarSeries,
        params: &LevelParams,
    ) -> Result<Arc<LevelResult>, LevelError> {
        let key = CacheKey::new(series, params);

        // --- Step 1: Try to get a lock and check if the key exists ---
        {
            if let Ok(cache) = self.cache.lock()
                && let Some(cached_result) = cache.get(&key)
            {
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_level_cache_events {
                    log::info!(
                        "Level cache HIT for {} (window {}, {:?})",
                        series.symbol_interval,
                        params.window,
                        params.mode
                    );
                }
                return Ok(Arc::clone(cached_result));
            }
        } // Lock is released here.

        // --- Step 2: If not found, compute the results and insert with a lock ---
        #[cfg(debug_assertions)]
        let computation_start_time = if DEBUG_FLAGS.print_level_cache_events {
            log::info!(
                "Level cache MISS for {} ({} bars)...",
                series.symbol_interval,
                series.len()
            );
            Some(std::time::Instant::now())
        } else {
            None
        };

        let arc_results = Arc::new(compute_levels(series, params)?);

        #[cfg(debug_assertions)]
        if let Some(start) = computation_start_time.as_ref() {
            log::info!(
                "Computation for {} took: {:?}",
                series.symbol_interval,
                start.elapsed()
            );
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, Arc::clone(&arc_results));
        }

        Ok(arc_results)
    }

    /// Runs every series in the collection independently, in parallel.
    /// One bad series does not stop the others; each gets its own result.
    pub fn compute_collection(
        &self,
        collection: &BarSeriesCollection,
        params: &LevelParams,
    ) -> Vec<(SymbolInterval, Result<Arc<LevelResult>, LevelError>)> {
        collection
            .series_data
            .par_iter()
            .map(|series| {
                (
                    series.symbol_interval.clone(),
                    self.get_levels(series, params),
                )
            })
            .collect()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    // Clears the entire cache e.g. if the source data was reloaded
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}
