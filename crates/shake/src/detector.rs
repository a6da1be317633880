//! Direction-reversal shake recognition.

use crate::settings::{ShakeSettings, SPEED_SCALE};
use crate::{AccelSample, AccelerometerSink};

/// Sign of the last significant X-axis movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Positive,
    Negative,
}

impl Direction {
    fn of(delta: f32) -> Self {
        if delta > 0.0 {
            Direction::Positive
        } else if delta < 0.0 {
            Direction::Negative
        } else {
            Direction::None
        }
    }
}

/// Callback invoked once per recognized shake.
pub type ShakeCallback = Box<dyn FnMut() + Send + 'static>;

/// Recognizes a shake as a burst of fast X-axis direction reversals.
///
/// Large motion in a single direction (carrying the device, a car
/// accelerating) never counts; the X axis has to flip sign
/// `required_reversals` times while the sum-of-axes speed stays above
/// `speed_threshold`. A single slow sample in between ends the episode.
pub struct ShakeDetector {
    settings: ShakeSettings,
    on_shake: ShakeCallback,
    last_sample_time_ms: u64,
    last_x: f32,
    last_y: f32,
    last_z: f32,
    shake_count: u32,
    last_direction: Direction,
    is_shaking: bool,
}

impl ShakeDetector {
    /// Create a detector with default thresholds.
    pub fn new<F>(on_shake: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::build(ShakeSettings::default(), Box::new(on_shake))
    }

    /// Create a detector with custom thresholds.
    pub fn with_settings<F>(settings: ShakeSettings, on_shake: F) -> crate::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        settings.validate()?;
        Ok(Self::build(settings, Box::new(on_shake)))
    }

    fn build(settings: ShakeSettings, on_shake: ShakeCallback) -> Self {
        Self {
            settings,
            on_shake,
            last_sample_time_ms: 0,
            last_x: 0.0,
            last_y: 0.0,
            last_z: 0.0,
            shake_count: 0,
            last_direction: Direction::None,
            is_shaking: false,
        }
    }

    pub fn settings(&self) -> ShakeSettings {
        self.settings
    }

    pub fn shake_count(&self) -> u32 {
        self.shake_count
    }

    pub fn is_shaking(&self) -> bool {
        self.is_shaking
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Timestamp of the last accepted sample, 0 before the first one.
    pub fn last_sample_time_ms(&self) -> u64 {
        self.last_sample_time_ms
    }

    /// Abandon the current episode. The last accepted sample is kept.
    pub fn reset(&mut self) {
        self.shake_count = 0;
        self.last_direction = Direction::None;
        self.is_shaking = false;
    }

    /// Feed one accelerometer sample.
    ///
    /// Returns true if this sample completed a shake gesture.
    pub fn process(&mut self, sample: AccelSample) -> bool {
        if !sample.is_finite() {
            tracing::trace!(?sample, "Dropping non-finite accelerometer sample");
            return false;
        }

        let elapsed_ms = sample.timestamp_ms.saturating_sub(self.last_sample_time_ms);
        if elapsed_ms < self.settings.min_sample_interval_ms {
            return false;
        }

        let delta_sum =
            sample.x + sample.y + sample.z - self.last_x - self.last_y - self.last_z;
        let speed = delta_sum.abs() / elapsed_ms as f32 * SPEED_SCALE;

        let mut fired = false;
        if speed > self.settings.speed_threshold {
            let delta_x = sample.x - self.last_x;
            if delta_x.abs() > self.settings.direction_threshold {
                fired = self.track_direction(Direction::of(delta_x));
            }
        } else if self.is_shaking {
            tracing::trace!(shake_count = self.shake_count, "Shake episode cancelled");
            self.reset();
        }

        self.last_x = sample.x;
        self.last_y = sample.y;
        self.last_z = sample.z;
        self.last_sample_time_ms = sample.timestamp_ms;

        fired
    }

    fn track_direction(&mut self, direction: Direction) -> bool {
        if !self.is_shaking {
            self.is_shaking = true;
            self.shake_count = 1;
            self.last_direction = direction;
        } else if direction != self.last_direction && self.last_direction != Direction::None {
            self.shake_count += 1;
            self.last_direction = direction;
        }

        if self.shake_count >= self.settings.required_reversals {
            tracing::debug!(reversals = self.shake_count, "Shake gesture recognized");
            (self.on_shake)();
            self.reset();
            return true;
        }
        false
    }
}

impl AccelerometerSink for ShakeDetector {
    fn on_sample(&mut self, sample: AccelSample) {
        self.process(sample);
    }
}

impl std::fmt::Debug for ShakeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShakeDetector")
            .field("settings", &self.settings)
            .field("shake_count", &self.shake_count)
            .field("last_direction", &self.last_direction)
            .field("is_shaking", &self.is_shaking)
            .finish_non_exhaustive()
    }
}
