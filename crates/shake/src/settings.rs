//! Tunable thresholds for shake recognition.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShakeError};

/// Samples closer together than this are dropped (ms).
pub const DEFAULT_MIN_SAMPLE_INTERVAL_MS: u64 = 50;

/// Scaled sum-of-axes speed a sample must exceed to count as shaking.
pub const DEFAULT_SPEED_THRESHOLD: f32 = 300.0;

/// Minimum X-axis delta for a sample to carry a direction.
pub const DEFAULT_DIRECTION_THRESHOLD: f32 = 1.0;

/// Direction changes needed within one episode to recognize a shake.
pub const DEFAULT_REQUIRED_REVERSALS: u32 = 4;

/// Scale factor applied to `|Δ(x+y+z)| / Δt`.
pub const SPEED_SCALE: f32 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeSettings {
    pub min_sample_interval_ms: u64,
    pub speed_threshold: f32,
    pub direction_threshold: f32,
    pub required_reversals: u32,
}

impl Default for ShakeSettings {
    fn default() -> Self {
        Self {
            min_sample_interval_ms: DEFAULT_MIN_SAMPLE_INTERVAL_MS,
            speed_threshold: DEFAULT_SPEED_THRESHOLD,
            direction_threshold: DEFAULT_DIRECTION_THRESHOLD,
            required_reversals: DEFAULT_REQUIRED_REVERSALS,
        }
    }
}

impl ShakeSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_sample_interval_ms == 0 {
            return Err(ShakeError::ZeroSampleInterval);
        }
        check_threshold("speed_threshold", self.speed_threshold)?;
        check_threshold("direction_threshold", self.direction_threshold)?;
        if self.required_reversals == 0 {
            return Err(ShakeError::ZeroReversals);
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShakeError::InvalidThreshold { name, value })
    }
}
