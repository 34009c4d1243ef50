use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tokio::runtime::Runtime;

use fractal_levels::data::timeseries::cache_file::CacheFile;
use fractal_levels::data::write_bar_data_async;
use fractal_levels::models::MostRecentIntervals;
use fractal_levels::utils::time_utils::epoch_ms_to_utc;
use fractal_levels::{
    BarSeries, BarSeriesCollection, Cli, LevelError, LevelGenerator, LevelResult, SymbolInterval,
    fetch_bar_data,
};

#[derive(Serialize)]
struct SeriesReport<'a> {
    series: String,
    bars: usize,
    last_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    levels: Option<&'a LevelResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let interval_ms = args.interval_ms()?;
    let periods = args.periods()?;
    let params = args.level_params();
    params.validate().context("Invalid level parameters")?;

    // C. Data Loading (Blocking)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let (bar_data, bar_signature) = rt
        .block_on(fetch_bar_data(&args, interval_ms))
        .context("No bar data available")?;

    // D. Background Cache Write
    let cache_write = rt.spawn(write_bar_data_async(
        bar_signature,
        bar_data.clone(),
        interval_ms,
        CacheFile::default_cache_path(interval_ms),
    ));

    // E. Select and trim the series to analyse
    let selected = select_series(&bar_data, &args, interval_ms, periods)?;
    let generator = LevelGenerator::default();
    let results = generator.compute_collection(&selected, &params);

    let reports: Vec<SeriesReport> = selected
        .series_data
        .iter()
        .zip(results.iter())
        .map(|(series, (_, result))| report(series, result))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Mode: {}  ({})", params.mode, bar_signature);
        for (series, (_, result)) in selected.series_data.iter().zip(results.iter()) {
            print_table(series, result);
        }
    }

    match rt.block_on(cache_write) {
        Ok(Err(e)) => log::error!("⚠️  Failed to write cache: {:#}", e),
        Err(e) => log::error!("⚠️  Cache write task failed: {}", e),
        Ok(Ok(())) => {}
    }

    if results.iter().all(|(_, r)| r.is_err()) {
        bail!("No series could be analysed");
    }
    Ok(())
}

fn select_series(
    data: &BarSeriesCollection,
    args: &Cli,
    interval_ms: i64,
    periods: usize,
) -> Result<BarSeriesCollection> {
    let series_data: Vec<BarSeries> = match &args.symbol {
        Some(label) => vec![
            data.find(SymbolInterval::ticker_from_label(label), interval_ms)?
                .clone(),
        ],
        None => data
            .series_data
            .iter()
            .filter(|s| s.symbol_interval.interval_ms == interval_ms)
            .cloned()
            .collect(),
    };

    if series_data.is_empty() {
        bail!(
            "No series with interval {} in {} (symbols: {})",
            args.interval,
            data.name,
            data.unique_symbols().join(", ")
        );
    }

    Ok(BarSeriesCollection {
        name: data.name.clone(),
        version: data.version,
        series_data: series_data
            .iter()
            .map(|s| s.most_recent(MostRecentIntervals::Count(periods)))
            .collect(),
    })
}

fn report<'a>(
    series: &BarSeries,
    result: &'a Result<Arc<LevelResult>, LevelError>,
) -> SeriesReport<'a> {
    SeriesReport {
        series: series.symbol_interval.to_string(),
        bars: series.len(),
        last_close: series.last_close(),
        levels: result.as_ref().ok().map(|r| &**r),
        error: result.as_ref().err().map(|e| e.to_string()),
    }
}

fn print_table(series: &BarSeries, result: &Result<Arc<LevelResult>, LevelError>) {
    let span = match (series.timestamps_ms.first(), series.last_timestamp_ms()) {
        (Some(&first), Some(last)) => format!("{} to {}", epoch_ms_to_utc(first), epoch_ms_to_utc(last)),
        _ => "no bars".to_string(),
    };
    let (low, high) = series.price_range().unwrap_or_default();
    println!();
    println!(
        "{}  {} bars, {}  range {:.4}..{:.4}  close {:.4}",
        series.symbol_interval,
        series.len(),
        span,
        low,
        high,
        series.last_close().unwrap_or_default()
    );

    let levels = match result {
        Ok(levels) => levels,
        Err(e) => {
            log::error!("{}: {}", series.symbol_interval, e);
            return;
        }
    };

    if levels.is_empty() {
        println!("  no levels");
        return;
    }
    let touch_date = |index: Option<usize>| {
        index
            .and_then(|i| series.timestamps_ms.get(i))
            .map(|&ts| epoch_ms_to_utc(ts))
            .unwrap_or_default()
    };
    for level in levels.levels() {
        println!(
            "  {}  touched {} to {}",
            level,
            touch_date(level.first_index()),
            touch_date(level.last_index())
        );
    }
}
