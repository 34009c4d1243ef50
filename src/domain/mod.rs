// Domain types and value objects
pub mod bar;
pub mod error;
pub mod symbol_interval;

// Re-export commonly used types
pub use bar::{Bar, BarType};
pub use error::LevelError;
pub use symbol_interval::SymbolInterval;
