//! Player seam.
//!
//! The handler never owns the player. It reads the position, seeks, and
//! holds at most one "is playing" listener registration, released through
//! an explicit [`ListenerId`] rather than by dropping references.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback for "is playing" transitions.
pub type PlayingListener = Arc<dyn Fn(bool) + Send + Sync + 'static>;

/// Handle returned by [`Player::add_playing_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A seekable media player owned elsewhere.
///
/// Implementations must not invoke listeners synchronously from inside
/// `add_playing_listener` or `remove_playing_listener`.
pub trait Player: Send + Sync {
    fn current_position_ms(&self) -> i64;

    fn is_playing(&self) -> bool;

    fn seek_to(&self, position_ms: i64);

    fn add_playing_listener(&self, listener: PlayingListener) -> ListenerId;

    fn remove_playing_listener(&self, id: ListenerId);
}

/// Type alias for a shared player reference.
pub type PlayerRef = Arc<dyn Player>;

/// Listener bookkeeping for `Player` implementations.
///
/// `notify` snapshots the listeners before calling them, so a listener may
/// remove itself (or others) while being notified.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, PlayingListener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<(ListenerId, PlayingListener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, listener: PlayingListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.guard().push((id, listener));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.guard();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn notify(&self, playing: bool) {
        let snapshot: Vec<PlayingListener> =
            self.guard().iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in snapshot {
            listener(playing);
        }
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

/// In-memory player driven by hand.
///
/// Useful for tests, demos, and headless integration. Seeking moves the
/// position immediately.
#[derive(Default)]
pub struct ManualPlayer {
    position_ms: AtomicI64,
    playing: AtomicBool,
    position_reads: AtomicU64,
    seeks: Mutex<Vec<i64>>,
    listeners: ListenerRegistry,
}

impl ManualPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position_ms(&self, position_ms: i64) {
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }

    pub fn set_position_secs(&self, position_secs: i64) {
        self.set_position_ms(position_secs * 1000);
    }

    /// Change the playing state, notifying listeners only on a transition.
    pub fn set_playing(&self, playing: bool) {
        let was_playing = self.playing.swap(playing, Ordering::SeqCst);
        if was_playing != playing {
            self.listeners.notify(playing);
        }
    }

    /// All seek targets so far, oldest first.
    pub fn seeks(&self) -> Vec<i64> {
        self.seeks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// How many times the position has been sampled.
    pub fn position_reads(&self) -> u64 {
        self.position_reads.load(Ordering::SeqCst)
    }
}

impl Player for ManualPlayer {
    fn current_position_ms(&self) -> i64 {
        self.position_reads.fetch_add(1, Ordering::SeqCst);
        self.position_ms.load(Ordering::SeqCst)
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn seek_to(&self, position_ms: i64) {
        self.seeks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(position_ms);
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }

    fn add_playing_listener(&self, listener: PlayingListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_playing_listener(&self, id: ListenerId) {
        if !self.listeners.remove(id) {
            tracing::debug!(?id, "Removing unknown playing listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_registry_assigns_distinct_ids() {
        let registry = ListenerRegistry::new();
        let a = registry.add(Arc::new(|_| {}));
        let b = registry.add(Arc::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_listener_can_remove_itself_during_notify() {
        let registry = Arc::new(ListenerRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let id_slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let registry_clone = Arc::clone(&registry);
        let calls_clone = Arc::clone(&calls);
        let slot_clone = Arc::clone(&id_slot);
        let id = registry.add(Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot_clone.lock().unwrap() {
                registry_clone.remove(id);
            }
        }));
        *id_slot.lock().unwrap() = Some(id);

        registry.notify(true);
        registry.notify(false);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_manual_player_notifies_on_transition_only() {
        let player = ManualPlayer::new();
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let transitions_clone = Arc::clone(&transitions);
        player.add_playing_listener(Arc::new(move |playing| {
            transitions_clone.lock().unwrap().push(playing);
        }));

        player.set_playing(true);
        player.set_playing(true);
        player.set_playing(false);

        assert_eq!(*transitions.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_manual_player_seek_moves_position() {
        let player = ManualPlayer::new();
        player.set_position_secs(12);
        player.seek_to(20_000);

        assert_eq!(player.current_position_ms(), 20_000);
        assert_eq!(player.seeks(), vec![20_000]);
        assert_eq!(player.position_reads(), 1);
    }
}
