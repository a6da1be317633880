//! Intro/outro skip handler.
//!
//! Samples the player position on a fixed period while playback runs and
//! keeps two "show skip button" signals up to date.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use anistream_events::{
    emit_event, event_names, EventBusRef, NullEventBus, Segment, SkipButtonChangedEvent,
    SkipPerformedEvent,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SkipError};
use crate::interval::SkipIntervals;
use crate::player::{ListenerId, PlayerRef, PlayingListener};
use crate::segment::{SegmentState, SegmentTracker};
use crate::settings::SkipSettings;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Segments {
    intro: SegmentTracker,
    outro: SegmentTracker,
}

impl Segments {
    fn get_mut(&mut self, segment: Segment) -> &mut SegmentTracker {
        match segment {
            Segment::Intro => &mut self.intro,
            Segment::Outro => &mut self.outro,
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

#[derive(Default)]
struct PollSlot {
    task: Option<PollTask>,
    listener: Option<ListenerId>,
}

struct Inner {
    player: PlayerRef,
    runtime: Handle,
    settings: SkipSettings,
    intervals: SkipIntervals,
    bus: EventBusRef,
    /// Lock order: `poll` before `segments`. Neither is held while the bus
    /// is called.
    poll: Mutex<PollSlot>,
    segments: Mutex<Segments>,
    intro_visible: watch::Sender<bool>,
    outro_visible: watch::Sender<bool>,
}

impl Inner {
    fn start(self: &Arc<Self>) {
        let mut poll = lock(&self.poll);
        if poll.task.as_ref().is_some_and(PollTask::is_active) {
            tracing::trace!("Skip handler already polling");
            return;
        }

        if poll.listener.is_none() {
            poll.listener = Some(self.player.add_playing_listener(self.playing_listener()));
        }

        let cancel = CancellationToken::new();
        let handle = self.runtime.spawn(poll_loop(
            Arc::downgrade(self),
            cancel.clone(),
            self.settings.poll_interval(),
        ));
        poll.task = Some(PollTask { cancel, handle });
    }

    fn stop(&self) {
        let (listener, changes) = {
            let mut poll = lock(&self.poll);
            let changes = self.halt(&mut poll);
            (poll.listener.take(), changes)
        };

        if let Some(id) = listener {
            self.player.remove_playing_listener(id);
        }
        self.emit_changes(changes);
    }

    /// Playback paused: same as `stop()` but the listener stays registered
    /// so the next play transition resumes sampling.
    fn pause(&self) {
        let changes = {
            let mut poll = lock(&self.poll);
            self.halt(&mut poll)
        };
        self.emit_changes(changes);
    }

    /// Cancel the loop and reset both segments. The token is cancelled
    /// before any caller releases the listener.
    fn halt(&self, poll: &mut PollSlot) -> Vec<SkipButtonChangedEvent> {
        if let Some(task) = poll.task.take() {
            task.cancel.cancel();
        }

        let mut segments = lock(&self.segments);
        segments.intro.reset();
        segments.outro.reset();
        [
            self.publish(Segment::Intro, false, None),
            self.publish(Segment::Outro, false, None),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn playing_listener(self: &Arc<Self>) -> PlayingListener {
        let weak = Arc::downgrade(self);
        Arc::new(move |playing| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if playing {
                inner.start();
            } else {
                inner.pause();
            }
        })
    }

    fn is_running(&self) -> bool {
        lock(&self.poll)
            .task
            .as_ref()
            .is_some_and(PollTask::is_active)
    }

    /// One sampling step. Skipped if `cancel` fired, checked under the
    /// segments lock so a concurrent `stop()` always wins.
    fn tick(&self, cancel: Option<&CancellationToken>) {
        let changes: Vec<_> = {
            let mut segments = lock(&self.segments);
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return;
            }

            let position_secs = self.player.current_position_ms() / 1000;
            let show_intro = segments.intro.observe(position_secs);
            let show_outro = segments.outro.observe(position_secs);
            [
                self.publish(Segment::Intro, show_intro, Some(position_secs)),
                self.publish(Segment::Outro, show_outro, Some(position_secs)),
            ]
            .into_iter()
            .flatten()
            .collect()
        };
        self.emit_changes(changes);
    }

    fn skip(&self, segment: Segment, end_time_secs: i64) {
        let target_ms = end_time_secs.saturating_mul(1000);
        self.player.seek_to(target_ms);

        let change = {
            let mut segments = lock(&self.segments);
            segments.get_mut(segment).mark_skipped();
            self.publish(segment, false, None)
        };

        tracing::debug!(%segment, target_ms, "Skipped segment");
        self.emit_changes(change);
        emit_event(
            self.bus.as_ref(),
            event_names::SKIP_PERFORMED,
            &SkipPerformedEvent { segment, target_ms },
        );
    }

    /// Update the watch channel. Returns the event to emit if visibility
    /// actually changed; the caller emits it after releasing its locks.
    fn publish(
        &self,
        segment: Segment,
        visible: bool,
        position_secs: Option<i64>,
    ) -> Option<SkipButtonChangedEvent> {
        let sender = match segment {
            Segment::Intro => &self.intro_visible,
            Segment::Outro => &self.outro_visible,
        };
        let changed = sender.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
        if !changed {
            return None;
        }

        tracing::debug!(%segment, visible, position_secs, "Skip button visibility changed");
        Some(SkipButtonChangedEvent {
            segment,
            visible,
            position_secs,
        })
    }

    fn emit_changes(&self, changes: impl IntoIterator<Item = SkipButtonChangedEvent>) {
        for change in changes {
            emit_event(self.bus.as_ref(), event_names::SKIP_BUTTON_CHANGED, &change);
        }
    }

    fn state(&self, segment: Segment) -> Option<SegmentState> {
        let mut segments = lock(&self.segments);
        segments.get_mut(segment).state()
    }
}

async fn poll_loop(weak: Weak<Inner>, cancel: CancellationToken, period: Duration) {
    tracing::info!(?period, "Skip handler polling started");
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(inner) = weak.upgrade() else {
            break;
        };
        if !inner.player.is_playing() {
            tracing::debug!("Playback not running, ending skip polling");
            break;
        }
        inner.tick(Some(&cancel));
        ticks += 1;
    }

    tracing::info!(ticks, "Skip handler polling stopped");
}

/// Shows intro/outro skip buttons while the playback position is inside
/// the episode's intervals.
///
/// Polling runs only while the player is playing: the handler registers an
/// "is playing" listener on `start()`. A pause cancels the loop and resets
/// both buttons, and the next play resumes it. `stop()` also releases the
/// listener. Dropping the handler stops it.
pub struct IntroOutroHandler {
    inner: Arc<Inner>,
}

impl IntroOutroHandler {
    /// Create a handler with default settings on the current tokio runtime.
    pub fn new(player: PlayerRef, intervals: SkipIntervals) -> Result<Self> {
        Self::builder(player, intervals).build()
    }

    /// Configure settings, runtime, or an event bus before building.
    pub fn builder(player: PlayerRef, intervals: SkipIntervals) -> IntroOutroHandlerBuilder {
        IntroOutroHandlerBuilder {
            player,
            intervals,
            settings: SkipSettings::default(),
            runtime: None,
            bus: None,
        }
    }

    /// Begin sampling. No-op while a sampling loop is already active.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Cancel sampling, release the player listener, and reset both
    /// buttons. Safe to call repeatedly.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Run one sampling step immediately, outside the polling loop.
    pub fn tick(&self) {
        self.inner.tick(None);
    }

    /// Seek past the intro and hide its button.
    pub fn skip_intro(&self, end_time_secs: i64) {
        self.inner.skip(Segment::Intro, end_time_secs);
    }

    /// Seek past the outro and hide its button.
    pub fn skip_outro(&self, end_time_secs: i64) {
        self.inner.skip(Segment::Outro, end_time_secs);
    }

    /// Current intro button visibility.
    pub fn show_intro_button(&self) -> bool {
        *self.inner.intro_visible.borrow()
    }

    /// Current outro button visibility.
    pub fn show_outro_button(&self) -> bool {
        *self.inner.outro_visible.borrow()
    }

    /// Observe intro button visibility.
    pub fn intro_button(&self) -> watch::Receiver<bool> {
        self.inner.intro_visible.subscribe()
    }

    /// Observe outro button visibility.
    pub fn outro_button(&self) -> watch::Receiver<bool> {
        self.inner.outro_visible.subscribe()
    }

    /// Intro button state, or `None` when the episode has no intro.
    pub fn intro_state(&self) -> Option<SegmentState> {
        self.inner.state(Segment::Intro)
    }

    /// Outro button state, or `None` when the episode has no outro.
    pub fn outro_state(&self) -> Option<SegmentState> {
        self.inner.state(Segment::Outro)
    }

    /// Whether a sampling loop is currently live.
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Intervals this handler was built with.
    pub fn intervals(&self) -> SkipIntervals {
        self.inner.intervals
    }

    /// Settings this handler was built with.
    pub fn settings(&self) -> SkipSettings {
        self.inner.settings
    }
}

impl Drop for IntroOutroHandler {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl std::fmt::Debug for IntroOutroHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntroOutroHandler")
            .field("intervals", &self.inner.intervals)
            .field("settings", &self.inner.settings)
            .field("running", &self.is_running())
            .field("show_intro", &self.show_intro_button())
            .field("show_outro", &self.show_outro_button())
            .finish_non_exhaustive()
    }
}

/// Builder for [`IntroOutroHandler`].
pub struct IntroOutroHandlerBuilder {
    player: PlayerRef,
    intervals: SkipIntervals,
    settings: SkipSettings,
    runtime: Option<Handle>,
    bus: Option<EventBusRef>,
}

impl IntroOutroHandlerBuilder {
    /// Override the default polling settings.
    pub fn settings(mut self, settings: SkipSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runtime for the polling task. Defaults to the current runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Publish visibility changes and skips on `bus`. Defaults to a
    /// [`NullEventBus`].
    pub fn event_bus(mut self, bus: EventBusRef) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Fails on invalid settings or when no runtime is available.
    pub fn build(self) -> Result<IntroOutroHandler> {
        self.settings.validate()?;
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| SkipError::NoRuntime)?,
        };

        let (intro_visible, _) = watch::channel(false);
        let (outro_visible, _) = watch::channel(false);

        Ok(IntroOutroHandler {
            inner: Arc::new(Inner {
                player: self.player,
                runtime,
                settings: self.settings,
                intervals: self.intervals,
                bus: self.bus.unwrap_or_else(|| Arc::new(NullEventBus)),
                poll: Mutex::new(PollSlot::default()),
                segments: Mutex::new(Segments {
                    intro: SegmentTracker::new(Segment::Intro, self.intervals.intro),
                    outro: SegmentTracker::new(Segment::Outro, self.intervals.outro),
                }),
                intro_visible,
                outro_visible,
            }),
        })
    }
}
