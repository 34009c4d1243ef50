use serde::{Deserialize, Serialize};

use crate::domain::{Bar, LevelError, SymbolInterval};
use crate::utils::maths_utils::{get_max, get_min};

// ============================================================================
// BarSeries: validated, oldest-first price history for one symbol/interval
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub symbol_interval: SymbolInterval,

    pub timestamps_ms: Vec<i64>,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,
}

/// How much recent history to keep when trimming a series
#[derive(Debug, Clone, Copy)]
pub enum MostRecentIntervals {
    Count(usize),
}

impl BarSeries {
    /// Builds a series from oldest-first bars, rejecting anything that breaks
    /// the bar or ordering invariants. No partial series is ever returned.
    pub fn new(symbol_interval: SymbolInterval, bars: &[Bar]) -> Result<Self, LevelError> {
        if bars.is_empty() {
            return Err(LevelError::EmptySeries);
        }

        let mut series = BarSeries {
            symbol_interval,
            timestamps_ms: Vec::with_capacity(bars.len()),
            open_prices: Vec::with_capacity(bars.len()),
            high_prices: Vec::with_capacity(bars.len()),
            low_prices: Vec::with_capacity(bars.len()),
            close_prices: Vec::with_capacity(bars.len()),
        };

        for (index, bar) in bars.iter().enumerate() {
            bar.validate(index)?;
            if let Some(&previous_ms) = series.timestamps_ms.last()
                && bar.timestamp_ms <= previous_ms
            {
                return Err(LevelError::NonIncreasingTimestamp {
                    index,
                    previous_ms,
                    current_ms: bar.timestamp_ms,
                });
            }
            series.timestamps_ms.push(bar.timestamp_ms);
            series.open_prices.push(bar.open_price);
            series.high_prices.push(bar.high_price);
            series.low_prices.push(bar.low_price);
            series.close_prices.push(bar.close_price);
        }

        Ok(series)
    }

    /// Re-checks every invariant. Needed for series that arrive through
    /// deserialization rather than `new`.
    pub fn validate(&self) -> Result<(), LevelError> {
        let n = self.timestamps_ms.len();
        if n == 0 {
            return Err(LevelError::EmptySeries);
        }
        let columns_agree = [
            self.open_prices.len(),
            self.high_prices.len(),
            self.low_prices.len(),
            self.close_prices.len(),
        ]
        .iter()
        .all(|&len| len == n);
        if !columns_agree {
            return Err(LevelError::InvalidBar {
                index: n - 1,
                reason: "has mismatched price column lengths".to_string(),
            });
        }

        for index in 0..n {
            self.get_bar(index).validate(index)?;
            if index > 0 && self.timestamps_ms[index] <= self.timestamps_ms[index - 1] {
                return Err(LevelError::NonIncreasingTimestamp {
                    index,
                    previous_ms: self.timestamps_ms[index - 1],
                    current_ms: self.timestamps_ms[index],
                });
            }
        }
        Ok(())
    }

    pub fn get_bar(&self, idx: usize) -> Bar {
        Bar::new(
            self.timestamps_ms[idx],
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
        )
    }

    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).map(|idx| self.get_bar(idx))
    }

    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    pub fn symbol(&self) -> &str {
        self.symbol_interval.symbol()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.timestamps_ms.last().copied()
    }

    /// (lowest low, highest high) across the whole series
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((get_min(&self.low_prices), get_max(&self.high_prices)))
    }

    pub fn get_indices_most_recent(
        &self,
        most_recent_intervals: MostRecentIntervals,
    ) -> (usize, usize) {
        let MostRecentIntervals::Count(final_num_intervals) = most_recent_intervals;

        let total_intervals = self.len();
        let start_index = total_intervals.saturating_sub(final_num_intervals);
        (start_index, total_intervals)
    }

    /// Copy of the newest bars. Order and validity carry over from `self`.
    pub fn most_recent(&self, most_recent_intervals: MostRecentIntervals) -> BarSeries {
        let (start, end) = self.get_indices_most_recent(most_recent_intervals);
        BarSeries {
            symbol_interval: self.symbol_interval.clone(),
            timestamps_ms: self.timestamps_ms[start..end].to_vec(),
            open_prices: self.open_prices[start..end].to_vec(),
            high_prices: self.high_prices[start..end].to_vec(),
            low_prices: self.low_prices[start..end].to_vec(),
            close_prices: self.close_prices[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimeUtils;

    fn daily(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Bar::new(i as i64 * TimeUtils::MS_IN_D, base, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect()
    }

    fn id() -> SymbolInterval {
        SymbolInterval::new("AAPL", TimeUtils::MS_IN_D)
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(BarSeries::new(id(), &[]), Err(LevelError::EmptySeries));
    }

    #[test]
    fn test_new_rejects_duplicate_timestamp() {
        let mut bars = daily(4);
        bars[2].timestamp_ms = bars[1].timestamp_ms;
        let err = BarSeries::new(id(), &bars).unwrap_err();
        assert!(matches!(
            err,
            LevelError::NonIncreasingTimestamp { index: 2, .. }
        ));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_new_rejects_invalid_bar() {
        let mut bars = daily(3);
        bars[1].low_price = bars[1].high_price + 1.0;
        assert!(matches!(
            BarSeries::new(id(), &bars),
            Err(LevelError::InvalidBar { index: 1, .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let series = BarSeries::new(id(), &daily(5)).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.last_close(), Some(104.5));
        assert_eq!(series.last_timestamp_ms(), Some(4 * TimeUtils::MS_IN_D));
        assert_eq!(series.price_range(), Some((99.0, 105.0)));
        assert_eq!(series.get_bar(2), daily(5)[2]);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_most_recent() {
        let series = BarSeries::new(id(), &daily(10)).unwrap();

        let last3 = series.most_recent(MostRecentIntervals::Count(3));
        assert_eq!(last3.len(), 3);
        assert_eq!(last3.timestamps_ms[0], 7 * TimeUtils::MS_IN_D);

        let all = series.most_recent(MostRecentIntervals::Count(500));
        assert_eq!(all, series);
    }

    #[test]
    fn test_validate_catches_tampered_columns() {
        let mut series = BarSeries::new(id(), &daily(3)).unwrap();
        series.close_prices.pop();
        assert!(series.validate().is_err());
    }
}
