use crate::config::{DEBUG_FLAGS, PERSISTENCE};
use crate::utils::time_utils::how_many_seconds_ago;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::data::timeseries::{BarSeriesCollection, CreateBarSeriesData, cache_file::CacheFile};

/// Checks the cache at `path` is readable, current-version, for the right
/// interval and not older than `recency_required_secs`.
pub fn check_local_data_validity(
    path: &Path,
    recency_required_secs: i64,
    version_required: f64,
    interval_ms: i64,
) -> Result<()> {
    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Checking validity of local cache at {:?}...", path);
    }
    let cache = CacheFile::load_from_path(path)?;

    if cache.version != version_required {
        bail!(
            "Cache version mismatch: file v{} vs required v{}",
            cache.version,
            version_required
        );
    }

    if cache.interval_ms != interval_ms {
        bail!(
            "Cache interval mismatch: file has {}ms intervals, expected {}ms",
            cache.interval_ms,
            interval_ms
        );
    }

    let seconds_ago = how_many_seconds_ago(cache.timestamp_ms);
    if seconds_ago > recency_required_secs {
        bail!(
            "Cache too old: created {} seconds ago (limit: {} seconds)",
            seconds_ago,
            recency_required_secs
        );
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!(
            "✅ Cache valid: v{}, {}s old (limit {}s), interval {}ms",
            cache.version,
            seconds_ago,
            recency_required_secs,
            cache.interval_ms
        );
    }

    Ok(())
}

/// Write bar data to a binary cache file.
/// Only data that came from an original source is written back.
pub fn write_bar_data_locally(
    data_signature: &'static str,
    collection: &BarSeriesCollection,
    interval_ms: i64,
    path: &Path,
) -> Result<()> {
    if data_signature == SerdeVersion::SIGNATURE {
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Skipping cache write (data already came from the cache)");
        }
        return Ok(());
    }

    // The file is labelled with one interval, so it only holds series of that interval
    let own_interval = BarSeriesCollection {
        name: collection.name.clone(),
        version: collection.version,
        series_data: collection
            .series_data
            .iter()
            .filter(|s| s.symbol_interval.interval_ms == interval_ms)
            .cloned()
            .collect(),
    };
    if own_interval.series_data.is_empty() {
        log::warn!("No series to cache for interval {}ms", interval_ms);
        return Ok(());
    }

    #[cfg(debug_assertions)]
    let start_time = DEBUG_FLAGS.print_serde.then(|| {
        log::info!("Writing cache to disk: {:?}...", path);
        std::time::Instant::now()
    });

    let cache = CacheFile::new(interval_ms, own_interval, PERSISTENCE.bars.version);
    cache.save_to_path(path)?;

    #[cfg(debug_assertions)]
    if let Some(start) = start_time {
        log::info!(
            "✅ Cache written: {} series in {:.2}s",
            cache.data.series_data.len(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Async wrapper for write_bar_data_locally
pub async fn write_bar_data_async(
    data_signature: &'static str,
    collection: BarSeriesCollection,
    interval_ms: i64,
    path: PathBuf,
) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        write_bar_data_locally(data_signature, &collection, interval_ms, &path)
    })
    .await
    .context("Cache write task panicked")?
}

/// Reads bars back from the bincode cache
pub struct SerdeVersion {
    pub path: PathBuf,
}

impl SerdeVersion {
    pub const SIGNATURE: &'static str = "Local Cache";

    pub fn for_interval(interval_ms: i64) -> Self {
        Self {
            path: CacheFile::default_cache_path(interval_ms),
        }
    }
}

#[async_trait]
impl CreateBarSeriesData for SerdeVersion {
    fn signature(&self) -> &'static str {
        Self::SIGNATURE
    }

    async fn create_bar_series_data(&self) -> Result<BarSeriesCollection> {
        let full_path = self.path.clone();

        #[cfg(debug_assertions)]
        let start_time = DEBUG_FLAGS.print_serde.then(|| {
            log::info!("Reading cache from: {:?}...", full_path);
            std::time::Instant::now()
        });

        let cache = tokio::task::spawn_blocking(move || CacheFile::load_from_path(&full_path))
            .await
            .context("Deserialization task panicked")?
            .context("Failed to load cache file")?;

        // Cached bytes bypass BarSeries::new, so re-check every series
        for series in &cache.data.series_data {
            series
                .validate()
                .with_context(|| format!("Cached series {} is invalid", series.symbol_interval))?;
        }

        #[cfg(debug_assertions)]
        if let Some(start) = start_time {
            log::info!(
                "✅ Cache loaded: {} series in {:.2}s",
                cache.data.series_data.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Ok(cache.data)
    }
}
