//! Error types for the benchmark harness.

use crate::checksum::Checksum;
use crate::strategy::StrategyKind;
use romstream_driver::StreamError;
use thiserror::Error;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors from configuring, running or verifying a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A strategy streamed the wrong bytes.
    #[error("{strategy} produced checksum {actual}, expected {expected}")]
    ChecksumMismatch {
        /// First mismatching strategy
        strategy: StrategyKind,
        /// Its checksum
        actual: Checksum,
        /// Oracle checksum
        expected: Checksum,
    },

    /// Invalid run configuration.
    #[error("Invalid benchmark configuration: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },

    /// Every registered strategy was skipped.
    #[error("No registered strategy can run on this platform ({skipped} skipped)")]
    NoRunnableStrategy {
        /// Number of skipped strategies
        skipped: usize,
    },

    /// Error from the data-movement layer.
    #[error(transparent)]
    Driver(#[from] StreamError),
}

impl BenchError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
