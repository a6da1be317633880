//! Error types for shake detection.

use thiserror::Error;

/// Errors raised while configuring a shake detector.
///
/// Sample processing itself never fails; bad samples are dropped.
#[derive(Debug, Error)]
pub enum ShakeError {
    #[error("minimum sample interval must be greater than zero")]
    ZeroSampleInterval,

    #[error("{name} must be a positive finite number (got {value})")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("required reversals must be at least 1")]
    ZeroReversals,
}

pub type Result<T> = std::result::Result<T, ShakeError>;
