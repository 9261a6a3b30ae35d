//! # Rendezvous Error Types

use thiserror::Error;

/// Errors that can occur while pairing requests with responders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RendezvousError {
    /// A queue was popped while empty. Length guards make this unreachable;
    /// hitting it aborts the pairing attempt.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),

    /// An installer was invoked with no request left to answer.
    #[error("no pending request to answer")]
    NothingPending,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for rendezvous operations.
pub type RendezvousResult<T> = Result<T, RendezvousError>;
