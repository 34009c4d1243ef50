use thiserror::Error;

/// Everything the level pipeline can reject.
///
/// Input errors mean the bar series itself is unusable; configuration errors
/// mean the caller asked for something meaningless. An empty result (no
/// fractals, no levels) is never an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error("invalid input: bar series is empty")]
    EmptySeries,

    #[error(
        "invalid input: timestamp at index {index} ({current_ms}) does not follow previous ({previous_ms})"
    )]
    NonIncreasingTimestamp {
        index: usize,
        previous_ms: i64,
        current_ms: i64,
    },

    #[error("invalid input: bar at index {index} {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("invalid configuration: window {window} is below the minimum of {min}")]
    InvalidWindow { window: usize, min: usize },

    #[error("invalid configuration: tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

impl LevelError {
    /// True for errors caused by the bar data rather than the parameters
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LevelError::EmptySeries
                | LevelError::NonIncreasingTimestamp { .. }
                | LevelError::InvalidBar { .. }
        )
    }

    pub fn is_configuration_error(&self) -> bool {
        !self.is_input_error()
    }
}
