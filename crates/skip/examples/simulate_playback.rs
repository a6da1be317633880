//! Example: Drive the skip handler with a simulated player.
//!
//! Run with: cargo run -p anistream-skip --example simulate_playback

use std::sync::Arc;
use std::time::Duration;

use anistream_events::{event_names, InMemoryEventBus};
use anistream_skip::{IntroOutroHandler, ManualPlayer, SkipIntervals, SkipSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,anistream_skip=debug")),
        )
        .init();

    println!("=== Skip Handler Example ===");

    let intervals: SkipIntervals = serde_json::from_str(
        r#"{"intro": {"start_secs": 5, "end_secs": 10}, "outro": {"start_secs": 20, "end_secs": 24}}"#,
    )?;
    let intro_end = intervals.intro.map(|i| i.end_secs()).unwrap_or_default();
    let outro_end = intervals.outro.map(|i| i.end_secs()).unwrap_or_default();

    let player = Arc::new(ManualPlayer::new());
    let bus = Arc::new(InMemoryEventBus::new());
    // One simulated second per 100ms of wall time.
    let handler = IntroOutroHandler::builder(player.clone(), intervals)
        .settings(SkipSettings {
            poll_interval_ms: 100,
        })
        .event_bus(bus.clone())
        .build()?;

    player.set_playing(true);
    handler.start();

    for second in 0..26 {
        player.set_position_secs(second);
        tokio::time::sleep(Duration::from_millis(100)).await;

        if second == 7 && handler.show_intro_button() {
            println!("[{second:>2}s] user taps 'Skip intro'");
            handler.skip_intro(intro_end);
        }
        if second == 22 && handler.show_outro_button() {
            println!("[{second:>2}s] user taps 'Skip outro'");
            handler.skip_outro(outro_end);
        }
    }

    player.set_playing(false);

    println!(
        "\nVisibility changes: {}, skips: {}, seeks: {:?}",
        bus.events_for(event_names::SKIP_BUTTON_CHANGED).len(),
        bus.events_for(event_names::SKIP_PERFORMED).len(),
        player.seeks()
    );
    Ok(())
}
