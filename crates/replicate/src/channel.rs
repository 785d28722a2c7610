use std::collections::BTreeMap;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashmap::DashMap;
use roomspace_common::{ObjectId, ParticipantId};
use serde::{Deserialize, Serialize};

use crate::event::{DeliveryMode, EventDraft, ReplicatedEvent, StateSlot};

/// Replication tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationTuning {
    /// Capacity of each participant's unreliable outbox. Updates beyond it
    /// are dropped; the next pose supersedes them anyway.
    pub unreliable_depth: usize,
}

impl Default for ReplicationTuning {
    fn default() -> Self {
        Self {
            unreliable_depth: 64,
        }
    }
}

#[derive(Debug, Default)]
struct ObjectStream {
    reliable_seq: u64,
    unreliable_seq: u64,
    latest: BTreeMap<StateSlot, ReplicatedEvent>,
}

#[derive(Debug)]
struct Outbox {
    reliable: Sender<ReplicatedEvent>,
    unreliable: Sender<ReplicatedEvent>,
}

/// Latest reliable state of every object, handed to a participant on join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReplay {
    /// Ordered by object, then sequence number.
    pub events: Vec<ReplicatedEvent>,
    /// Highest reliable sequence number already published per object. Live
    /// events at or below it are covered by the replay.
    pub watermarks: BTreeMap<ObjectId, u64>,
}

impl JoinReplay {
    /// True when there is nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of replayed events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// A participant's end of the channel.
#[derive(Debug)]
pub struct Subscription {
    pub participant: ParticipantId,
    pub replay: JoinReplay,
    pub reliable: Receiver<ReplicatedEvent>,
    pub unreliable: Receiver<ReplicatedEvent>,
}

/// Host side of replication.
///
/// Stamps each published event with the next sequence number for its object
/// and delivery mode, remembers the latest reliable event per state slot for
/// replay, and fans the event out to every subscribed participant.
#[derive(Debug)]
pub struct ReplicationChannel {
    streams: DashMap<ObjectId, ObjectStream>,
    outboxes: DashMap<ParticipantId, Outbox>,
    tuning: ReplicationTuning,
}

impl Default for ReplicationChannel {
    fn default() -> Self {
        Self::new(ReplicationTuning::default())
    }
}

impl ReplicationChannel {
    /// A channel with no subscribers and no history.
    pub fn new(tuning: ReplicationTuning) -> Self {
        Self {
            streams: DashMap::new(),
            outboxes: DashMap::new(),
            tuning,
        }
    }

    /// Register a participant and capture the replay it starts from.
    ///
    /// The outbox is registered before the replay is captured, so an event
    /// published in between shows up in both; the replica discards the live
    /// copy as stale using the watermark.
    pub fn subscribe(&self, participant: ParticipantId) -> Subscription {
        let (reliable_tx, reliable_rx) = crossbeam_channel::unbounded();
        let (unreliable_tx, unreliable_rx) =
            crossbeam_channel::bounded(self.tuning.unreliable_depth.max(1));
        self.outboxes.insert(
            participant,
            Outbox {
                reliable: reliable_tx,
                unreliable: unreliable_tx,
            },
        );
        let replay = self.replay();
        tracing::debug!(
            participant = %participant,
            events = replay.len(),
            "participant subscribed"
        );
        Subscription {
            participant,
            replay,
            reliable: reliable_rx,
            unreliable: unreliable_rx,
        }
    }

    /// Stop delivering to `participant`. False if it was not subscribed.
    pub fn unsubscribe(&self, participant: ParticipantId) -> bool {
        let removed = self.outboxes.remove(&participant).is_some();
        if removed {
            tracing::debug!(participant = %participant, "participant unsubscribed");
        }
        removed
    }

    /// Number of subscribed participants.
    pub fn subscriber_count(&self) -> usize {
        self.outboxes.len()
    }

    /// Compacted reliable state of every object.
    pub fn replay(&self) -> JoinReplay {
        let mut replay = JoinReplay::default();
        for stream in self.streams.iter() {
            if stream.reliable_seq > 0 {
                replay.watermarks.insert(*stream.key(), stream.reliable_seq);
            }
            replay.events.extend(stream.latest.values().copied());
        }
        replay.events.sort_by_key(|e| (e.object, e.seq));
        replay
    }

    /// Stamp and deliver an event. Returns the stamped event.
    ///
    /// The object's stream entry is held while fanning out, so events of one
    /// object reach every outbox in sequence order.
    pub fn publish(&self, draft: EventDraft) -> ReplicatedEvent {
        let mode = draft.kind.delivery_mode();
        let mut stream = self.streams.entry(draft.object).or_default();
        let seq = match mode {
            DeliveryMode::BufferedReliable => {
                stream.reliable_seq += 1;
                stream.reliable_seq
            }
            DeliveryMode::ContinuousUnreliable => {
                stream.unreliable_seq += 1;
                stream.unreliable_seq
            }
        };
        let event = ReplicatedEvent {
            object: draft.object,
            kind: draft.kind,
            payload: draft.payload,
            mode,
            origin: draft.origin,
            seq,
        };
        if let Some(slot) = event.slot().filter(|_| event.is_reliable()) {
            stream.latest.insert(slot, event);
        }

        let mut disconnected = Vec::new();
        for outbox in self.outboxes.iter() {
            let sent = match mode {
                DeliveryMode::BufferedReliable => outbox.reliable.send(event).is_ok(),
                DeliveryMode::ContinuousUnreliable => match outbox.unreliable.try_send(event) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(
                            participant = %outbox.key(),
                            object = %event.object,
                            seq,
                            "unreliable outbox full, update dropped"
                        );
                        true
                    }
                    Err(TrySendError::Disconnected(_)) => false,
                },
            };
            if !sent {
                disconnected.push(*outbox.key());
            }
        }
        drop(stream);

        for participant in disconnected {
            self.unsubscribe(participant);
        }
        match mode {
            DeliveryMode::BufferedReliable => tracing::debug!(
                object = %event.object,
                kind = ?event.kind,
                seq,
                origin = %event.origin,
                "reliable event published"
            ),
            DeliveryMode::ContinuousUnreliable => tracing::trace!(
                object = %event.object,
                seq,
                origin = %event.origin,
                "pose streamed"
            ),
        }
        event
    }

    /// Highest reliable sequence number published for `object`.
    pub fn reliable_watermark(&self, object: ObjectId) -> u64 {
        self.streams.get(&object).map_or(0, |s| s.reliable_seq)
    }
}
