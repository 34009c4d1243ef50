// Fractal detection, level clustering and selection
pub mod fractal_detector;
pub mod level_aggregator;
pub mod level_generator;
pub mod level_selector;

// Re-export commonly used types
pub use fractal_detector::detect;
pub use level_aggregator::{aggregate, aggregate_with};
pub use level_generator::{LevelGenerator, LevelParams, Tolerance, compute_levels};
pub use level_selector::{select_all, select_extreme, select_global};
