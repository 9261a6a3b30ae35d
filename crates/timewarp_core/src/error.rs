//! # Core Error Types
//!
//! All errors that can occur while driving cycles.

use thiserror::Error;

/// Errors that can occur in the cycle host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The host kept waking itself past the configured drain bound.
    #[error("cycle limit exceeded: still waking after {limit} consecutive cycles")]
    CycleLimitExceeded {
        /// The configured bound.
        limit: u64,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
