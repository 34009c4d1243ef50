use serde::{Deserialize, Serialize};

use crate::utils::TimeUtils;

/// Identity of one bar series: which security, at which bar width.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct SymbolInterval {
    pub symbol: String,
    pub interval_ms: i64,
}

impl SymbolInterval {
    pub fn new(symbol: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            symbol: symbol.into(),
            interval_ms,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Interval name as the data provider spells it (e.g. `1day`)
    pub fn interval_name(&self) -> &'static str {
        TimeUtils::interval_to_string(self.interval_ms)
    }

    // Pulls the ticker out of a "Name (TICKER)" picker label.
    // Returns the trimmed text unchanged when there are no parentheses.
    pub fn ticker_from_label(label: &str) -> &str {
        match (label.find('('), label.find(')')) {
            (Some(open), Some(close)) if open < close => label[open + 1..close].trim(),
            _ => label.trim(),
        }
    }
}

impl std::fmt::Display for SymbolInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.interval_name())
    }
}
