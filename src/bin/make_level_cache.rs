use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use fractal_levels::config::PERSISTENCE;
use fractal_levels::data::timeseries::cache_file::CacheFile;
use fractal_levels::data::timeseries::twelve_data::parse_payload;
use fractal_levels::data::BarSeriesCollection;
use fractal_levels::utils::TimeUtils;

/// Converts saved Twelve Data payloads into the bincode bar cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Twelve Data `time_series` JSON files
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Interval the cache is written for
    #[arg(long, default_value = "1day")]
    interval: String,

    /// Output path (defaults to the standard cache location)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    build_level_cache(Args::parse())
}

fn build_level_cache(args: Args) -> Result<()> {
    let interval_ms = TimeUtils::interval_from_str(&args.interval)
        .with_context(|| format!("Unknown interval {:?}", args.interval))?;

    let mut collection = BarSeriesCollection {
        name: "Twelve Data export".to_string(),
        version: PERSISTENCE.bars.version,
        series_data: Vec::new(),
    };

    for path in &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        for series in parse_payload(&text).with_context(|| format!("In file {:?}", path))? {
            if series.symbol_interval.interval_ms != interval_ms {
                log::warn!(
                    "Skipping {} from {:?}: not a {} series",
                    series.symbol_interval,
                    path,
                    args.interval
                );
                continue;
            }
            collection.upsert(series);
        }
    }

    if collection.series_data.is_empty() {
        bail!("No {} series found in the input files", args.interval);
    }

    println!(
        "Loaded {} series: {}",
        collection.series_data.len(),
        collection.unique_symbols().join(", ")
    );

    let output_path = args
        .output
        .unwrap_or_else(|| CacheFile::default_cache_path(interval_ms));
    let cache = CacheFile::new(interval_ms, collection, PERSISTENCE.bars.version);
    cache.save_to_path(&output_path)?;

    println!(
        "✅ Cache written to {:?} with {} series.",
        output_path,
        cache.data.series_data.len()
    );
    Ok(())
}
