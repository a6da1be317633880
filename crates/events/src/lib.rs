//! Shared event contracts for playback gesture signals.
//!
//! The shake detector and the intro/outro skip handler publish their
//! signals through these DTOs so that the UI layer (and tests) can consume
//! them without depending on either crate's internals.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};

/// Which skippable segment of an episode an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Intro,
    Outro,
}

impl Segment {
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Intro => "intro",
            Segment::Outro => "outro",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Event emitted when a shake gesture is recognized.
///
/// Producers: shake detector
/// Consumers: player screen (opens the quick-action sheet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeDetectedEvent {
    /// Timestamp in milliseconds since epoch.
    pub ts_ms: i64,
}

impl ShakeDetectedEvent {
    pub fn now() -> Self {
        Self {
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Event emitted when a skip button appears or disappears.
///
/// Producers: intro/outro handler
/// Consumers: player overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipButtonChangedEvent {
    pub segment: Segment,
    pub visible: bool,
    /// Playback position (whole seconds) when the change was observed.
    #[serde(default)]
    pub position_secs: Option<i64>,
}

/// Event emitted when the user skips a segment.
///
/// Producers: intro/outro handler
/// Consumers: watch-progress tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipPerformedEvent {
    pub segment: Segment,
    /// Seek target in milliseconds.
    pub target_ms: i64,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Shake gesture recognized.
    pub const SHAKE_DETECTED: &str = "shake:detected";
    /// Skip button visibility changed.
    pub const SKIP_BUTTON_CHANGED: &str = "skip:button_changed";
    /// Segment skipped by the user.
    pub const SKIP_PERFORMED: &str = "skip:performed";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_serializes_lowercase() {
        let json = serde_json::to_string(&Segment::Outro).unwrap();
        assert_eq!(json, "\"outro\"");
    }

    #[test]
    fn test_button_changed_deserialize_minimal() {
        let json = r#"{"segment": "intro", "visible": true}"#;
        let event: SkipButtonChangedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.segment, Segment::Intro);
        assert!(event.visible);
        assert_eq!(event.position_secs, None);
    }

    #[test]
    fn test_skip_performed_deserialize() {
        let json = r#"{"segment": "outro", "target_ms": 1010000}"#;
        let event: SkipPerformedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.segment, Segment::Outro);
        assert_eq!(event.target_ms, 1_010_000);
    }

    #[test]
    fn test_shake_event_timestamp_is_recent() {
        let event = ShakeDetectedEvent::now();
        assert!(event.ts_ms > 0);
    }
}
