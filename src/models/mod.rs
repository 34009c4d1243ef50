// Domain models for level detection
// Pure data independent of loading or presentation

pub mod bar_series;
pub mod fractal;
pub mod level;

// Re-export key types for convenience
pub use bar_series::{BarSeries, MostRecentIntervals};
pub use fractal::{Fractal, FractalKind};
pub use level::{GlobalLevels, Level, LevelMode, LevelResult, LevelSide, Representative};
