//! Error types for streaming operations

use crate::capabilities::Mover;
use romstream_chip::MemoryTier;
use thiserror::Error;

/// Result type alias for streaming operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while setting up a transfer path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The mover cannot move data between the two tiers on this platform
    #[error("{mover} cannot transfer {from} -> {to} on this platform")]
    UnsupportedRoute {
        /// Engine that was asked to move data
        mover: Mover,
        /// Source tier
        from: MemoryTier,
        /// Destination tier
        to: MemoryTier,
    },

    /// Platform or backend configuration is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },
}

impl StreamError {
    /// Create an unsupported route error
    pub fn unsupported_route(mover: Mover, from: MemoryTier, to: MemoryTier) -> Self {
        Self::UnsupportedRoute { mover, from, to }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
