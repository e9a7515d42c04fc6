//! Mining Error Types

use thiserror::Error;

/// Errors surfaced by the mining pipeline.
///
/// An empty log is not an error: every engine returns an empty model for it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MineError {
    /// Binding enumeration is exponential in node fan-in/out, so activities
    /// whose ingoing or outgoing neighbourhood exceeds the configured ceiling
    /// are rejected before any subsets are materialized.
    #[error("activity '{activity}' has fan-{direction} {fan_out}, exceeding the binding ceiling of {ceiling}")]
    FanOutExceeded {
        activity: String,
        direction: String,
        fan_out: usize,
        ceiling: usize,
    },

    /// A threshold is outside its admissible range
    #[error("invalid threshold {parameter} = {value}: expected {expected}")]
    InvalidThreshold {
        parameter: String,
        value: f64,
        expected: String,
    },
}
