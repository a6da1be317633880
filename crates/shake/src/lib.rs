//! Shake gesture detection for the anistream player.
//!
//! A shake is recognized from raw tri-axial accelerometer samples when the
//! X axis reverses direction several times in quick succession. Sustained
//! one-directional acceleration (walking, a vehicle) never triggers it.
//!
//! # Example
//!
//! ```ignore
//! use anistream_shake::{AccelSample, AccelerometerSink, ShakeDetector};
//!
//! let mut detector = ShakeDetector::new(|| println!("shake!"));
//! detector.on_sample(AccelSample::new(0.4, 9.8, 0.1, 1_000));
//! ```
//!
//! For sensors that deliver on their own thread, push samples through a
//! [`sensor_feed`] and run the detector with [`spawn_shake_listener`].

mod detector;
mod error;
mod feed;
mod settings;

use anistream_events::{emit_event, event_names, EventBusRef, ShakeDetectedEvent};

pub use detector::{Direction, ShakeCallback, ShakeDetector};
pub use error::{Result, ShakeError};
pub use feed::{
    sensor_feed, spawn_shake_listener, SensorFeedReceiver, SensorFeedSender,
    DEFAULT_FEED_CAPACITY,
};
pub use settings::{
    ShakeSettings, DEFAULT_DIRECTION_THRESHOLD, DEFAULT_MIN_SAMPLE_INTERVAL_MS,
    DEFAULT_REQUIRED_REVERSALS, DEFAULT_SPEED_THRESHOLD, SPEED_SCALE,
};

/// One accelerometer reading in device acceleration units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Sensor timestamp in milliseconds (monotonic).
    pub timestamp_ms: u64,
}

impl AccelSample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Anything that consumes accelerometer samples.
///
/// The sensor subsystem guarantees calls are not re-entrant.
pub trait AccelerometerSink: Send {
    fn on_sample(&mut self, sample: AccelSample);
}

/// Build a shake callback that publishes [`ShakeDetectedEvent`] on `bus`.
pub fn bus_callback(bus: EventBusRef) -> impl FnMut() + Send + 'static {
    move || {
        emit_event(
            bus.as_ref(),
            event_names::SHAKE_DETECTED,
            &ShakeDetectedEvent::now(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anistream_events::InMemoryEventBus;
    use std::sync::Arc;

    #[test]
    fn test_sample_finiteness() {
        assert!(AccelSample::new(1.0, -2.0, 9.8, 0).is_finite());
        assert!(!AccelSample::new(f32::NAN, 0.0, 0.0, 0).is_finite());
        assert!(!AccelSample::new(0.0, 0.0, f32::NEG_INFINITY, 0).is_finite());
    }

    #[test]
    fn test_bus_callback_publishes_event() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut detector = ShakeDetector::new(bus_callback(bus.clone()));

        let sink: &mut dyn AccelerometerSink = &mut detector;
        for (i, x) in [0.0, 5.0, -5.0, 5.0, -5.0].iter().enumerate() {
            sink.on_sample(AccelSample::new(*x, 0.0, 0.0, 1000 + i as u64 * 100));
        }

        let events = bus.events_for(event_names::SHAKE_DETECTED);
        assert_eq!(events.len(), 1);
        assert!(events[0].payload["ts_ms"].as_i64().unwrap() > 0);
    }
}
