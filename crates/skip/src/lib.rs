//! Intro/outro skip buttons for the anistream player.
//!
//! Episode metadata may carry an intro and an outro interval (whole
//! seconds). While playback runs, [`IntroOutroHandler`] samples the player
//! position once per second and exposes two observable booleans telling the
//! UI whether to show "Skip intro" / "Skip outro". Skipping seeks the player
//! to the interval's end.
//!
//! Each button follows a small state machine:
//!
//! ```text
//!   Armed ──enter──▶ Shown ──skip──▶ Skipped
//!     ▲                │                │
//!     └─────exit───────┴──────exit──────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use anistream_skip::{IntroOutroHandler, SkipInterval, SkipIntervals};
//!
//! let intervals = SkipIntervals::new(Some(SkipInterval::new(85, 175)?), None);
//! let handler = IntroOutroHandler::new(player, intervals)?;
//! handler.start();
//!
//! let mut intro = handler.intro_button();
//! while intro.changed().await.is_ok() {
//!     render_skip_button(*intro.borrow());
//! }
//! ```

mod error;
mod handler;
mod interval;
mod player;
mod segment;
mod settings;

pub use anistream_events::Segment;
pub use error::{Result, SkipError};
pub use handler::{IntroOutroHandler, IntroOutroHandlerBuilder};
pub use interval::{SkipInterval, SkipIntervals};
pub use player::{
    ListenerId, ListenerRegistry, ManualPlayer, Player, PlayerRef, PlayingListener,
};
pub use segment::SegmentState;
pub use settings::{SkipSettings, DEFAULT_POLL_INTERVAL_MS};
