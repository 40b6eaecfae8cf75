// Error types
// TK Ales, 2022

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("Insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Query time {time} outside model domain [{start}, {end}]")]
    OutOfDomain { time: f64, start: i64, end: i64 },

    #[error("Non-monotonic time at sample index {index}: {current} follows {previous}")]
    NonMonotonicTime { index: usize, previous: i64, current: i64 },

    #[error("Time span [{start}, {end}] is too wide to interpolate over")]
    TimeSpanOverflow { start: i64, end: i64 },

    #[error("Non-finite value {value} at sample index {index}")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("Column {column} does not share the time axis of column 0")]
    DomainMismatch { column: usize },

    #[error("Invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl CalibError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CalibError::MalformedInput { line, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, CalibError>;
