//! Example: Replay a synthetic accelerometer trace through the sensor feed.
//!
//! Run with: cargo run -p anistream-shake --example replay_shake

use std::sync::Arc;

use anistream_events::{event_names, InMemoryEventBus};
use anistream_shake::{
    bus_callback, sensor_feed, spawn_shake_listener, AccelSample, ShakeDetector,
    DEFAULT_FEED_CAPACITY,
};
use tokio_util::sync::CancellationToken;

/// Device resting, one sustained push, then a vigorous shake.
fn trace() -> Vec<AccelSample> {
    let mut samples = Vec::new();
    let mut t = 1_000;
    let mut push = |x: f32, samples: &mut Vec<AccelSample>| {
        samples.push(AccelSample::new(x, 9.8, 0.2, t));
        t += 60;
    };

    for _ in 0..5 {
        push(0.0, &mut samples);
    }
    for x in [3.0, 6.0, 9.0, 12.0] {
        push(x, &mut samples);
    }
    for _ in 0..3 {
        push(12.0, &mut samples);
    }
    for x in [16.0, 8.0, 16.0, 8.0, 16.0] {
        push(x, &mut samples);
    }
    samples
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("anistream_shake=trace")
        .init();

    println!("=== Shake Replay Example ===");

    let bus = Arc::new(InMemoryEventBus::new());
    let detector = ShakeDetector::new(bus_callback(bus.clone()));

    let (sender, receiver) = sensor_feed(DEFAULT_FEED_CAPACITY);
    let handle = spawn_shake_listener(receiver, detector, CancellationToken::new());

    for sample in trace() {
        sender.send(sample);
    }
    drop(sender);

    let detector = handle.await?;
    let shakes = bus.events_for(event_names::SHAKE_DETECTED);
    println!("Shakes detected: {}", shakes.len());
    println!("Final detector state: {:?}", detector);
    Ok(())
}
