//! Intro/outro intervals from episode metadata.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkipError};

/// Closed range of whole seconds, `[start_secs, end_secs]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct SkipInterval {
    start_secs: i64,
    end_secs: i64,
}

#[derive(Deserialize)]
struct RawInterval {
    start_secs: i64,
    end_secs: i64,
}

impl TryFrom<RawInterval> for SkipInterval {
    type Error = SkipError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        SkipInterval::new(raw.start_secs, raw.end_secs)
    }
}

impl SkipInterval {
    pub fn new(start_secs: i64, end_secs: i64) -> Result<Self> {
        if start_secs > end_secs {
            return Err(SkipError::InvalidInterval {
                start_secs,
                end_secs,
            });
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    pub fn start_secs(&self) -> i64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> i64 {
        self.end_secs
    }

    /// Both ends inclusive.
    pub fn contains(&self, position_secs: i64) -> bool {
        (self.start_secs..=self.end_secs).contains(&position_secs)
    }
}

/// The skippable segments of one episode. Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipIntervals {
    #[serde(default)]
    pub intro: Option<SkipInterval>,
    #[serde(default)]
    pub outro: Option<SkipInterval>,
}

impl SkipIntervals {
    pub fn new(intro: Option<SkipInterval>, outro: Option<SkipInterval>) -> Self {
        Self { intro, outro }
    }

    pub fn is_empty(&self) -> bool {
        self.intro.is_none() && self.outro.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let interval = SkipInterval::new(10, 20).unwrap();
        assert!(!interval.contains(9));
        assert!(interval.contains(10));
        assert!(interval.contains(15));
        assert!(interval.contains(20));
        assert!(!interval.contains(21));
    }

    #[test]
    fn test_single_second_interval() {
        let interval = SkipInterval::new(42, 42).unwrap();
        assert!(interval.contains(42));
        assert!(!interval.contains(43));
    }

    #[test]
    fn test_rejects_reversed_interval() {
        let err = SkipInterval::new(20, 10).unwrap_err();
        assert!(matches!(
            err,
            SkipError::InvalidInterval {
                start_secs: 20,
                end_secs: 10
            }
        ));
    }

    #[test]
    fn test_deserialize_episode_metadata() {
        let json = r#"{"intro": {"start_secs": 10, "end_secs": 20}}"#;
        let intervals: SkipIntervals = serde_json::from_str(json).unwrap();
        assert_eq!(intervals.intro, Some(SkipInterval::new(10, 20).unwrap()));
        assert_eq!(intervals.outro, None);
        assert!(!intervals.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_reversed_interval() {
        let json = r#"{"outro": {"start_secs": 1010, "end_secs": 1000}}"#;
        assert!(serde_json::from_str::<SkipIntervals>(json).is_err());
    }

    #[test]
    fn test_empty_metadata() {
        let intervals: SkipIntervals = serde_json::from_str("{}").unwrap();
        assert!(intervals.is_empty());
    }
}
