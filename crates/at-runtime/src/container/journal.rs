//! Lifecycle instrumentation.

use parking_lot::Mutex;
use shared_types::{LifecycleState, SubsystemKind};

/// Receives construction and destruction notifications from a Context.
pub trait LifecycleObserver: Send + Sync {
    fn constructed(&self, kind: SubsystemKind, seq: u64);

    fn destroyed(&self, kind: SubsystemKind, seq: u64);

    fn state_changed(&self, _from: LifecycleState, _to: LifecycleState) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Constructed { kind: SubsystemKind, seq: u64 },
    Destroyed { kind: SubsystemKind, seq: u64 },
    StateChanged { from: LifecycleState, to: LifecycleState },
}

/// Observer that records every event in order.
#[derive(Debug, Default)]
pub struct LifecycleJournal {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl LifecycleJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    /// `(kind, seq)` of every construction, in order.
    pub fn constructed(&self) -> Vec<(SubsystemKind, u64)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::Constructed { kind, seq } => Some((*kind, *seq)),
                _ => None,
            })
            .collect()
    }

    /// `(kind, seq)` of every destruction, in order.
    pub fn destroyed(&self) -> Vec<(SubsystemKind, u64)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::Destroyed { kind, seq } => Some((*kind, *seq)),
                _ => None,
            })
            .collect()
    }

    /// States entered, in order.
    pub fn states(&self) -> Vec<LifecycleState> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl LifecycleObserver for LifecycleJournal {
    fn constructed(&self, kind: SubsystemKind, seq: u64) {
        self.events
            .lock()
            .push(LifecycleEvent::Constructed { kind, seq });
    }

    fn destroyed(&self, kind: SubsystemKind, seq: u64) {
        self.events.lock().push(LifecycleEvent::Destroyed { kind, seq });
    }

    fn state_changed(&self, from: LifecycleState, to: LifecycleState) {
        self.events
            .lock()
            .push(LifecycleEvent::StateChanged { from, to });
    }
}
