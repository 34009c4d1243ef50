// Async bar loading that runs before any levels are computed

use anyhow::Result;

use crate::Cli;
use crate::config::PERSISTENCE;
use crate::data::timeseries::serde_version::{SerdeVersion, check_local_data_validity};
use crate::data::timeseries::twelve_data::TwelveDataVersion;
use crate::data::timeseries::{
    BarSeriesCollection, CreateBarSeriesData, get_bar_series_data_async,
};

#[allow(unused_imports)]
use crate::config::DEBUG_FLAGS;

/// Loads bars for `interval_ms` from the JSON files named on the command line
/// and the local cache. The cache is only offered when it passes
/// `check_local_data_validity`; `--prefer-cache` moves it to the front.
pub async fn fetch_bar_data(
    args: &Cli,
    interval_ms: i64,
) -> Result<(BarSeriesCollection, &'static str)> {
    let files = TwelveDataVersion {
        paths: args.input.clone(),
    };
    let cache = SerdeVersion::for_interval(interval_ms);

    let providers: Vec<Box<dyn CreateBarSeriesData + Send + Sync>> = match (
        args.prefer_cache,
        check_local_data_validity(
            &cache.path,
            PERSISTENCE.bars.acceptable_age_secs,
            PERSISTENCE.bars.version,
            interval_ms,
        ),
    ) {
        (true, Ok(_)) => vec![Box::new(cache), Box::new(files)], // cache first
        (false, Ok(_)) => vec![Box::new(files), Box::new(cache)], // files first
        (_, Err(e)) => {
            if args.input.is_empty() {
                log::warn!("⚠️  Local cache unusable: {:#}", e);
            } else {
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_serde {
                    log::info!("Local cache skipped: {:#}", e);
                }
            }
            vec![Box::new(files)] // files only
        }
    };

    let (data, signature) = get_bar_series_data_async(&providers).await?;

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!(
            "Retrieved {} series using: {}.",
            data.series_data.len(),
            signature
        );
    }

    Ok((data, signature))
}
