use serde::{Deserialize, Serialize};

/// Which extreme of the bar made it a fractal
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum FractalKind {
    High,
    Low,
}

/// A local extremum found by the detector. Only meaningful alongside the
/// `BarSeries` it was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    /// Position in the source series
    pub index: usize,
    pub timestamp_ms: i64,
    pub kind: FractalKind,
    /// Bar high for `High`, bar low for `Low`
    pub price: f64,
}

impl Fractal {
    pub fn is_high(&self) -> bool {
        self.kind == FractalKind::High
    }
}
