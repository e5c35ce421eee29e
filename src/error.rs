// ECG Sentinel — Error Types
//
// The pipeline itself never fails; these cover bad configuration and bad
// input reaching the pipeline boundary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("{field} range [{min}, {max}] is empty")]
    EmptyRange { field: &'static str, min: u32, max: u32 },

    #[error("{field} = {value} exceeds buffer capacity {capacity}")]
    ExceedsCapacity { field: &'static str, value: usize, capacity: usize },

    #[error("recovery margin {recovery} BPM must be below spike margin {spike} BPM")]
    NoHysteresis { recovery: u16, spike: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("ADC reading {0} outside 0..=4095")]
    OutOfRange(i32),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
