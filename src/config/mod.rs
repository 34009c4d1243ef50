//! Configuration module for the fractal levels application.

pub mod analysis;

mod debug; // Private: callers go through the DEBUG_FLAGS re-export
pub use debug::DEBUG_FLAGS;

pub mod persistence;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig};
pub use persistence::{PERSISTENCE, bar_cache_filename};
