//! Reader for Twelve Data `time_series` payloads saved to disk.
//!
//! Prices arrive as strings and rows arrive newest first. Rows are reversed
//! to oldest first and then go through the normal `BarSeries` validation, so
//! a payload is either accepted whole or rejected.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;

use crate::data::timeseries::{BarSeriesCollection, CreateBarSeriesData};
use crate::domain::{Bar, SymbolInterval};
use crate::models::BarSeries;
use crate::utils::TimeUtils;

#[allow(unused_imports)]
use crate::config::DEBUG_FLAGS;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TimeSeriesMeta {
    pub symbol: String,
    pub interval: String,
}

/// One row as sent. Every field is optional so that missing values are
/// reported as empty data rather than as a parse failure.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawValue {
    pub datetime: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub meta: Option<TimeSeriesMeta>,
    #[serde(default)]
    pub values: Vec<RawValue>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A file holds one response or a list of them
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PayloadFile {
    Many(Vec<TimeSeriesResponse>),
    One(TimeSeriesResponse),
}

fn field<'a>(value: &'a Option<String>, name: &str, row: usize) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => bail!("Empty data found in the dataset: row {} has no {}", row, name),
    }
}

fn price(value: &Option<String>, name: &str, row: usize) -> Result<f64> {
    let text = field(value, name, row)?;
    text.parse::<f64>()
        .with_context(|| format!("Row {} has a non-numeric {}: {:?}", row, name, text))
}

impl TimeSeriesResponse {
    pub fn into_bar_series(self) -> Result<BarSeries> {
        if self.status.as_deref() == Some("error") {
            bail!(
                "Provider returned an error (code {}): {}",
                self.code.unwrap_or_default(),
                self.message.unwrap_or_else(|| "no message".to_string())
            );
        }

        let meta = self.meta.context("Payload has no meta block")?;
        if self.values.is_empty() {
            bail!("No data fetched for {}", meta.symbol);
        }

        let interval_ms = TimeUtils::interval_from_str(&meta.interval)
            .with_context(|| format!("Unknown interval {:?} for {}", meta.interval, meta.symbol))?;

        let mut bars = Vec::with_capacity(self.values.len());
        // Newest first on the wire
        for (row, raw) in self.values.iter().enumerate().rev() {
            let datetime = field(&raw.datetime, "datetime", row)?;
            let timestamp_ms = TimeUtils::parse_datetime_ms(datetime)
                .with_context(|| format!("Row {} has an unreadable datetime {:?}", row, datetime))?;
            bars.push(Bar::new(
                timestamp_ms,
                price(&raw.open, "open", row)?,
                price(&raw.high, "high", row)?,
                price(&raw.low, "low", row)?,
                price(&raw.close, "close", row)?,
            ));
        }

        let symbol_interval = SymbolInterval::new(meta.symbol, interval_ms);
        let series = BarSeries::new(symbol_interval.clone(), &bars)
            .with_context(|| format!("Rejected bar data for {}", symbol_interval))?;
        Ok(series)
    }
}

/// Parses the text of a saved payload file into one series per response
pub fn parse_payload(text: &str) -> Result<Vec<BarSeries>> {
    let payload: PayloadFile =
        serde_json::from_str(text).context("Failed to parse Twelve Data payload")?;
    let responses = match payload {
        PayloadFile::Many(responses) => responses,
        PayloadFile::One(response) => vec![response],
    };
    responses
        .into_iter()
        .map(TimeSeriesResponse::into_bar_series)
        .collect()
}

/// Loads saved Twelve Data payloads from disk
pub struct TwelveDataVersion {
    pub paths: Vec<PathBuf>,
}

#[async_trait]
impl CreateBarSeriesData for TwelveDataVersion {
    fn signature(&self) -> &'static str {
        "Twelve Data JSON"
    }

    async fn create_bar_series_data(&self) -> Result<BarSeriesCollection> {
        if self.paths.is_empty() {
            bail!("No Twelve Data files given");
        }

        let mut collection = BarSeriesCollection {
            name: "Twelve Data export".to_string(),
            version: 1.0,
            series_data: Vec::new(),
        };

        for path in &self.paths {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let series_list =
                parse_payload(&text).with_context(|| format!("In file {}", path.display()))?;

            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_serde {
                log::info!("Read {} series from {}", series_list.len(), path.display());
            }

            for series in series_list {
                collection.upsert(series);
            }
        }

        Ok(collection)
    }
}
