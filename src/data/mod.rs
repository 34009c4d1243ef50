// Data loading and caching
pub mod loader;
pub mod timeseries;

// Re-export commonly used types
pub use loader::fetch_bar_data;
pub use timeseries::serde_version::write_bar_data_async;
pub use timeseries::{BarSeriesCollection, CreateBarSeriesData};
