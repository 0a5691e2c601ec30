//! Lifecycle notifications and listener registration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Duration;

use super::session::SessionRecord;
use super::timer::TimerPhase;

/// A notification emitted by the timer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    /// The phase changed (including re-arming the same phase).
    PhaseChanged {
        /// Phase now active
        phase: TimerPhase,
        /// Time left in that phase
        remaining: Duration,
    },
    /// One poll of the drive loop.
    Tick {
        /// Phase being polled
        phase: TimerPhase,
        /// Time left in that phase
        remaining: Duration,
    },
    /// A session was sealed, by natural completion or manual stop.
    SessionCompleted(SessionRecord),
}

impl FocusEvent {
    /// The kind of this event, for filtered subscriptions.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PhaseChanged { .. } => EventKind::PhaseChanged,
            Self::Tick { .. } => EventKind::Tick,
            Self::SessionCompleted(_) => EventKind::SessionCompleted,
        }
    }
}

/// Event categories a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `FocusEvent::PhaseChanged`
    PhaseChanged,
    /// `FocusEvent::Tick`
    Tick,
    /// `FocusEvent::SessionCompleted`
    SessionCompleted,
}

/// A registered callback.
pub type Listener = Arc<dyn Fn(&FocusEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    kind: Option<EventKind>,
    listener: Listener,
}

/// Registry of listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Listeners {
    /// Register a listener; `kind = None` receives every event.
    pub fn subscribe(&self, kind: Option<EventKind>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry { id, kind, listener });
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Listeners interested in `event`, in registration order.
    ///
    /// Returned as clones so callbacks run without holding the registry lock.
    #[must_use]
    pub fn matching(&self, event: &FocusEvent) -> Vec<Listener> {
        let kind = event.kind();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.kind.map_or(true, |k| k == kind))
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
