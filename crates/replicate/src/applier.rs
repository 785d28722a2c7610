use std::collections::{BTreeMap, HashMap};

use roomspace_common::ObjectId;

use crate::ReplicationError;
use crate::channel::JoinReplay;
use crate::event::ReplicatedEvent;

/// Orders incoming events on the participant side.
///
/// Reliable events come out in gap-free sequence order per object; early
/// arrivals are held until the missing ones show up. Unreliable events come
/// out only if newer than the last one released for the same object.
#[derive(Debug, Default)]
pub struct ReplicaApplier {
    /// Last reliable sequence number released per object.
    applied: HashMap<ObjectId, u64>,
    held: HashMap<ObjectId, BTreeMap<u64, ReplicatedEvent>>,
    last_unreliable: HashMap<ObjectId, u64>,
}

impl ReplicaApplier {
    /// An applier that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start every object's reliable stream after the replay watermark.
    pub fn seed(&mut self, replay: &JoinReplay) {
        for (object, watermark) in &replay.watermarks {
            let applied = self.applied.entry(*object).or_insert(0);
            *applied = (*applied).max(*watermark);
            if let Some(held) = self.held.get_mut(object) {
                held.retain(|seq, _| *seq > *watermark);
            }
        }
    }

    /// Highest reliable sequence applied for `object`.
    pub fn last_reliable(&self, object: ObjectId) -> u64 {
        self.applied.get(&object).copied().unwrap_or(0)
    }

    /// Highest unreliable sequence applied for `object`.
    pub fn last_unreliable(&self, object: ObjectId) -> u64 {
        self.last_unreliable.get(&object).copied().unwrap_or(0)
    }

    /// Number of reliable events waiting for a gap to fill.
    pub fn held_back(&self) -> usize {
        self.held.values().map(BTreeMap::len).sum()
    }

    /// Accept a reliable event. Returns the events now ready to apply, in
    /// order; empty if `event` had to be held back.
    pub fn accept_reliable(
        &mut self,
        event: ReplicatedEvent,
    ) -> Result<Vec<ReplicatedEvent>, ReplicationError> {
        let applied = self.applied.entry(event.object).or_insert(0);
        if event.seq <= *applied {
            return Err(ReplicationError::StaleSequence {
                object: event.object,
                seq: event.seq,
                last: *applied,
            });
        }
        let held = self.held.entry(event.object).or_default();
        if event.seq > *applied + 1 {
            tracing::trace!(
                object = %event.object,
                seq = event.seq,
                expected = *applied + 1,
                "reliable event held back"
            );
            held.insert(event.seq, event);
            return Ok(Vec::new());
        }

        let mut ready = vec![event];
        *applied = event.seq;
        while let Some(next) = held.remove(&(*applied + 1)) {
            *applied = next.seq;
            ready.push(next);
        }
        if held.is_empty() {
            self.held.remove(&event.object);
        }
        Ok(ready)
    }

    /// Accept an unreliable event if it is the newest seen for its object.
    pub fn accept_unreliable(
        &mut self,
        event: ReplicatedEvent,
    ) -> Result<ReplicatedEvent, ReplicationError> {
        let last = self.last_unreliable.entry(event.object).or_insert(0);
        if event.seq <= *last {
            return Err(ReplicationError::StaleSequence {
                object: event.object,
                seq: event.seq,
                last: *last,
            });
        }
        *last = event.seq;
        Ok(event)
    }

    /// Route an event by its delivery mode.
    pub fn accept(
        &mut self,
        event: ReplicatedEvent,
    ) -> Result<Vec<ReplicatedEvent>, ReplicationError> {
        if event.is_reliable() {
            self.accept_reliable(event)
        } else {
            self.accept_unreliable(event).map(|e| vec![e])
        }
    }
}
