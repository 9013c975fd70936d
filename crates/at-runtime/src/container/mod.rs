//! # Subsystem Arena
//!
//! Owns every subsystem handle of one Context.
//!
//! ## Ordering
//!
//! Slots are inserted in [`SubsystemKind::CONSTRUCTION_ORDER`] and each gets a
//! sequence number that increases by one per insertion. Teardown pops slots
//! from the back, so destruction visits sequence numbers in strictly
//! decreasing order. Dropping the arena tears it down, which also covers a
//! graph abandoned half-built by a failing factory.
//!
//! ## Cross-references
//!
//! Subsystems never own each other. They remember the [`SubsystemKind`] of
//! what they depend on and look it up here.

mod factories;
mod journal;

pub use factories::{BuildScope, SubsystemFactories, SubsystemFactory};
pub use journal::{LifecycleEvent, LifecycleJournal, LifecycleObserver};

use std::sync::Arc;

use at_telemetry::{SUBSYSTEMS_CONSTRUCTED, SUBSYSTEMS_DESTROYED};
use shared_types::{DynSubsystem, Subsystem, SubsystemError, SubsystemErrorKind, SubsystemKind};
use tracing::debug;

struct Slot {
    kind: SubsystemKind,
    seq: u64,
    handle: DynSubsystem,
}

/// Ordered slots of subsystem handles.
pub struct SubsystemArena {
    slots: Vec<Slot>,
    next_seq: u64,
    observer: Option<Arc<dyn LifecycleObserver>>,
}

impl SubsystemArena {
    pub fn new(observer: Option<Arc<dyn LifecycleObserver>>) -> Self {
        Self {
            slots: Vec::with_capacity(SubsystemKind::CONSTRUCTION_ORDER.len()),
            next_seq: 1,
            observer,
        }
    }

    /// Append a handle and return its sequence number.
    ///
    /// Rejects a kind that is already present, a kind that would break the
    /// construction order, and a kind whose required dependencies are absent.
    pub fn insert(&mut self, handle: DynSubsystem) -> Result<u64, SubsystemError> {
        let kind = handle.kind();
        if self.contains(kind) {
            return Err(SubsystemError::new(
                kind,
                SubsystemErrorKind::InitializationFailed,
                "slot already constructed",
            ));
        }
        if let Some(last) = self.slots.last() {
            if last.kind.ordinal() > kind.ordinal() {
                return Err(SubsystemError::new(
                    kind,
                    SubsystemErrorKind::InitializationFailed,
                    format!("cannot be constructed after {}", last.kind),
                ));
            }
        }
        if let Some(missing) = kind
            .dependencies()
            .iter()
            .find(|dep| !dep.is_optional() && !self.contains(**dep))
        {
            return Err(SubsystemError::missing_dependency(kind, *missing));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.push(Slot { kind, seq, handle });

        SUBSYSTEMS_CONSTRUCTED.with_label_values(&[kind.name()]).inc();
        debug!("[Arena] Constructed {} (seq {})", kind, seq);
        if let Some(observer) = &self.observer {
            observer.constructed(kind, seq);
        }
        Ok(seq)
    }

    pub fn contains(&self, kind: SubsystemKind) -> bool {
        self.slots.iter().any(|s| s.kind == kind)
    }

    pub fn handle(&self, kind: SubsystemKind) -> Option<&dyn Subsystem> {
        self.slots
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.handle.as_ref())
    }

    /// Typed lookup of a slot.
    pub fn get<T: 'static>(&self, kind: SubsystemKind) -> Option<&T> {
        self.handle(kind)?.as_any().downcast_ref::<T>()
    }

    pub fn sequence(&self, kind: SubsystemKind) -> Option<u64> {
        self.slots.iter().find(|s| s.kind == kind).map(|s| s.seq)
    }

    /// Constructed kinds in construction order.
    pub fn kinds(&self) -> impl Iterator<Item = SubsystemKind> + '_ {
        self.slots.iter().map(|s| s.kind)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `{ "<kind>": { "seq": n, ...describe() } }`
    pub fn snapshot(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for slot in &self.slots {
            let mut entry = match slot.handle.describe() {
                serde_json::Value::Object(fields) => fields,
                other => {
                    let mut fields = serde_json::Map::new();
                    fields.insert("value".into(), other);
                    fields
                }
            };
            entry.insert("seq".into(), slot.seq.into());
            map.insert(slot.kind.name().into(), serde_json::Value::Object(entry));
        }
        serde_json::Value::Object(map)
    }

    /// Destroy every slot, last constructed first. Returns the kinds in
    /// destruction order.
    pub fn teardown(&mut self) -> Vec<SubsystemKind> {
        let mut destroyed = Vec::with_capacity(self.slots.len());
        while let Some(slot) = self.slots.pop() {
            let Slot { kind, seq, handle } = slot;
            drop(handle);
            SUBSYSTEMS_DESTROYED.with_label_values(&[kind.name()]).inc();
            debug!("[Arena] Destroyed {} (seq {})", kind, seq);
            if let Some(observer) = &self.observer {
                observer.destroyed(kind, seq);
            }
            destroyed.push(kind);
        }
        destroyed
    }
}

impl Drop for SubsystemArena {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for SubsystemArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
