//! Error types for skip handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkipError {
    /// Interval ends before it starts.
    #[error("invalid skip interval: start {start_secs}s is after end {end_secs}s")]
    InvalidInterval { start_secs: i64, end_secs: i64 },

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    /// Handler built outside a tokio runtime without an explicit handle.
    #[error("no tokio runtime available - build the handler inside a runtime or pass a handle")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, SkipError>;
