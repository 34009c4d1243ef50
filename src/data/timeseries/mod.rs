pub mod cache_file;
pub mod serde_version;
pub mod twelve_data;

use crate::models::BarSeries;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A source of bar data. Stands in for the market-data provider: it either
/// hands back complete, validated series or fails as a whole.
#[async_trait]
pub trait CreateBarSeriesData {
    async fn create_bar_series_data(&self) -> Result<BarSeriesCollection>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Tries each provider in order and returns the first success
pub async fn get_bar_series_data_async(
    implementations: &[Box<dyn CreateBarSeriesData + Send + Sync>],
) -> Result<(BarSeriesCollection, &'static str)> {
    for imp in implementations {
        match imp.create_bar_series_data().await {
            Ok(data) => {
                let signature = imp.signature();
                return Ok((data, signature));
            }
            Err(e) => {
                log::info!("Error with bar data source {}: {:#}", imp.signature(), e);
                // Continue to the next implementation
            }
        }
    }
    Err(anyhow!("All bar data sources failed to create data"))
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct BarSeriesCollection {
    pub name: String, // Metadata e.g. "Twelve Data export"
    pub version: f64,
    pub series_data: Vec<BarSeries>,
}

impl BarSeriesCollection {
    pub fn unique_symbols(&self) -> Vec<String> {
        // BTreeSet maintains sorted order and ensures uniqueness
        self.series_data
            .iter()
            .map(|s| s.symbol().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn find(&self, symbol: &str, interval_ms: i64) -> Result<&BarSeries> {
        self.series_data
            .iter()
            .find(|s| {
                s.symbol_interval.symbol.eq_ignore_ascii_case(symbol)
                    && s.symbol_interval.interval_ms == interval_ms
            })
            .ok_or_else(|| {
                anyhow!(
                    "No bar data found for symbol {} with interval {} ms",
                    symbol,
                    interval_ms
                )
            })
    }

    /// Adds a series, replacing any existing one with the same symbol and interval
    pub fn upsert(&mut self, series: BarSeries) {
        match self
            .series_data
            .iter_mut()
            .find(|s| s.symbol_interval == series.symbol_interval)
        {
            Some(existing) => *existing = series,
            None => self.series_data.push(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, SymbolInterval};
    use crate::utils::TimeUtils;

    fn series(symbol: &str, n: usize) -> BarSeries {
        let bars: Vec<Bar> = (0..n)
            .map(|i| Bar::new(i as i64, 10.0, 11.0, 9.0, 10.5))
            .collect();
        BarSeries::new(SymbolInterval::new(symbol, TimeUtils::MS_IN_D), &bars).unwrap()
    }

    struct Failing;
    struct Fixed;

    #[async_trait]
    impl CreateBarSeriesData for Failing {
        async fn create_bar_series_data(&self) -> Result<BarSeriesCollection> {
            Err(anyhow!("rate limited"))
        }
        fn signature(&self) -> &'static str {
            "Failing"
        }
    }

    #[async_trait]
    impl CreateBarSeriesData for Fixed {
        async fn create_bar_series_data(&self) -> Result<BarSeriesCollection> {
            Ok(BarSeriesCollection {
                name: "fixed".to_string(),
                version: 1.0,
                series_data: vec![series("AAPL", 3)],
            })
        }
        fn signature(&self) -> &'static str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_providers_fall_through_in_order() {
        let providers: Vec<Box<dyn CreateBarSeriesData + Send + Sync>> =
            vec![Box::new(Failing), Box::new(Fixed)];
        let (data, signature) = get_bar_series_data_async(&providers).await.unwrap();
        assert_eq!(signature, "Fixed");
        assert_eq!(data.series_data.len(), 1);

        let only_failing: Vec<Box<dyn CreateBarSeriesData + Send + Sync>> = vec![Box::new(Failing)];
        assert!(get_bar_series_data_async(&only_failing).await.is_err());
    }

    #[test]
    fn test_find_and_upsert() {
        let mut collection = BarSeriesCollection::default();
        collection.upsert(series("MSFT", 3));
        collection.upsert(series("AAPL", 3));
        collection.upsert(series("AAPL", 5));

        assert_eq!(collection.unique_symbols(), vec!["AAPL", "MSFT"]);
        assert_eq!(collection.find("aapl", TimeUtils::MS_IN_D).unwrap().len(), 5);
        assert!(collection.find("AAPL", TimeUtils::MS_IN_W).is_err());
    }
}
