use serde::{Deserialize, Serialize};

use crate::domain::error::LevelError;

#[derive(Debug, PartialEq)]
pub enum BarType {
    Bullish,
    Bearish,
}

/// One OHLC observation. Fields are plain data; `validate` enforces the
/// price invariants when the bar joins a `BarSeries`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp_ms: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
}

impl Bar {
    pub fn new(
        timestamp_ms: i64,
        open_price: f64,
        high_price: f64,
        low_price: f64,
        close_price: f64,
    ) -> Self {
        Bar {
            timestamp_ms,
            open_price,
            high_price,
            low_price,
            close_price,
        }
    }

    pub fn get_type(&self) -> BarType {
        if self.close_price >= self.open_price {
            BarType::Bullish
        } else {
            BarType::Bearish
        }
    }

    // Returns the low and high of the bar body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            BarType::Bullish => (self.open_price, self.close_price),
            BarType::Bearish => (self.close_price, self.open_price),
        }
    }

    /// Checks prices are positive and finite, and that open/close sit inside [low, high].
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::InvalidBar { index, reason };

        let prices = [
            ("open", self.open_price),
            ("high", self.high_price),
            ("low", self.low_price),
            ("close", self.close_price),
        ];
        for (name, price) in prices {
            if !price.is_finite() || price <= 0.0 {
                return Err(invalid(format!("has non-positive or non-finite {name} {price}")));
            }
        }

        if self.low_price > self.high_price {
            return Err(invalid(format!(
                "has low {} above high {}",
                self.low_price, self.high_price
            )));
        }

        let (body_low, body_high) = self.body_range();
        if body_low < self.low_price || body_high > self.high_price {
            return Err(invalid(format!(
                "has body [{body_low}, {body_high}] outside range [{}, {}]",
                self.low_price, self.high_price
            )));
        }

        Ok(())
    }
}
