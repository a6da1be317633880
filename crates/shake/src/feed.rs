//! Bounded sample feed from the sensor thread to the shake detector.
//!
//! Sensor subsystems call back on their own thread at high frequency. The
//! sender never blocks that thread: when the feed is full the newest sample
//! is dropped, which is harmless since the detector rate-limits anyway.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{AccelSample, ShakeDetector};

/// Default feed capacity in samples (~1s at a 64Hz sensor rate).
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Smallest capacity the feed will allocate.
const MIN_FEED_CAPACITY: usize = 8;

#[derive(Clone)]
pub struct SensorFeedSender {
    tx: mpsc::Sender<AccelSample>,
    dropped_samples: Arc<AtomicU64>,
}

impl SensorFeedSender {
    /// Push a sample without blocking.
    ///
    /// Returns true if queued, false if dropped (feed full or closed).
    pub fn send(&self, sample: AccelSample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped_samples.fetch_add(1, Ordering::Relaxed) + 1;
                // Only log every 10th drop to avoid spam
                if dropped % 10 == 1 {
                    tracing::warn!(dropped, "Sensor feed full, dropping samples");
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Sensor feed closed");
                false
            }
        }
    }

    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct SensorFeedReceiver {
    rx: mpsc::Receiver<AccelSample>,
    received: u64,
}

impl SensorFeedReceiver {
    pub async fn recv(&mut self) -> Option<AccelSample> {
        let sample = self.rx.recv().await?;
        self.received += 1;
        Some(sample)
    }

    pub fn try_recv(&mut self) -> Option<AccelSample> {
        let sample = self.rx.try_recv().ok()?;
        self.received += 1;
        Some(sample)
    }

    /// Number of samples handed out so far.
    pub fn received(&self) -> u64 {
        self.received
    }
}

/// Create a feed holding at most `capacity` pending samples.
pub fn sensor_feed(capacity: usize) -> (SensorFeedSender, SensorFeedReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(MIN_FEED_CAPACITY));
    (
        SensorFeedSender {
            tx,
            dropped_samples: Arc::new(AtomicU64::new(0)),
        },
        SensorFeedReceiver { rx, received: 0 },
    )
}

/// Run `detector` over the feed until cancelled or the feed closes.
///
/// The detector is handed back when the task ends so the caller can
/// re-register it with a new feed.
pub fn spawn_shake_listener(
    mut receiver: SensorFeedReceiver,
    mut detector: ShakeDetector,
    cancel: CancellationToken,
) -> JoinHandle<ShakeDetector> {
    tokio::spawn(async move {
        tracing::info!("Shake listener started");
        let mut shakes = 0u64;

        loop {
            let sample = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Shake listener cancelled");
                    break;
                }
                sample = receiver.recv() => sample,
            };

            let Some(sample) = sample else {
                tracing::info!("Sensor feed closed, stopping shake listener");
                break;
            };

            if detector.process(sample) {
                shakes += 1;
            }
        }

        tracing::info!(
            samples = receiver.received(),
            shakes,
            "Shake listener stopped"
        );
        detector
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn shake_samples(start_ms: u64) -> Vec<AccelSample> {
        [0.0, 5.0, -5.0, 5.0, -5.0]
            .iter()
            .enumerate()
            .map(|(i, x)| AccelSample::new(*x, 0.0, 0.0, start_ms + i as u64 * 100))
            .collect()
    }

    #[test]
    fn test_capacity_has_floor() {
        let (sender, _receiver) = sensor_feed(1);
        for i in 0..MIN_FEED_CAPACITY {
            assert!(sender.send(AccelSample::new(0.0, 0.0, 0.0, i as u64)));
        }
        assert!(!sender.send(AccelSample::new(0.0, 0.0, 0.0, 99)));
        assert_eq!(sender.dropped_samples(), 1);
    }

    #[test]
    fn test_try_recv_preserves_order() {
        let (sender, mut receiver) = sensor_feed(DEFAULT_FEED_CAPACITY);
        for ts in [100, 150, 200] {
            sender.send(AccelSample::new(0.0, 0.0, 0.0, ts));
        }

        let received: Vec<u64> = std::iter::from_fn(|| receiver.try_recv())
            .map(|s| s.timestamp_ms)
            .collect();
        assert_eq!(received, vec![100, 150, 200]);
        assert_eq!(receiver.received(), 3);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (sender, receiver) = sensor_feed(DEFAULT_FEED_CAPACITY);
        drop(receiver);
        assert!(sender.is_closed());
        assert!(!sender.send(AccelSample::new(0.0, 0.0, 0.0, 0)));
        assert_eq!(sender.dropped_samples(), 0);
    }

    #[tokio::test]
    async fn test_listener_detects_shake_and_returns_detector() {
        let (sender, receiver) = sensor_feed(DEFAULT_FEED_CAPACITY);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let detector = ShakeDetector::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        let handle = spawn_shake_listener(receiver, detector, CancellationToken::new());
        for sample in shake_samples(1000) {
            assert!(sender.send(sample));
        }
        drop(sender);

        let detector = handle.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(detector.shake_count(), 0);
        assert_eq!(detector.last_sample_time_ms(), 1400);
    }

    #[tokio::test]
    async fn test_listener_stops_on_cancel() {
        let (sender, receiver) = sensor_feed(DEFAULT_FEED_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = spawn_shake_listener(receiver, ShakeDetector::new(|| {}), cancel.clone());

        cancel.cancel();
        let detector = handle.await.unwrap();

        assert_eq!(detector.last_sample_time_ms(), 0);
        assert!(sender.is_closed());
    }
}
