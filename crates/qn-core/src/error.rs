//! Error type for sampling and configuration.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::StreamId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("exponential mean must be > 0, got {mean} (stream {stream})")]
    InvalidMean { mean: f64, stream: StreamId },

    #[error("arrival rate must be > 0, got {rate} (stream {stream})")]
    InvalidRate { rate: f64, stream: StreamId },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `qn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
