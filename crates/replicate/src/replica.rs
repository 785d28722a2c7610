use std::collections::BTreeMap;

use roomspace_common::{ObjectId, ParticipantId};
use roomspace_kernel::{AxisLocks, InteractableObject, ObjectRegistry, OwnershipRecord};

use crate::ReplicationError;
use crate::applier::ReplicaApplier;
use crate::channel::{JoinReplay, Subscription};
use crate::event::{EventKind, EventPayload, ReplicatedEvent};

/// A participant's local copy of the room's objects.
///
/// Built from the scene catalog every participant loads, then brought up to
/// date from the join replay and the live event streams.
#[derive(Debug)]
pub struct Replica {
    participant: ParticipantId,
    registry: ObjectRegistry,
    seats: BTreeMap<ObjectId, BTreeMap<usize, ParticipantId>>,
    applier: ReplicaApplier,
}

impl Replica {
    /// A replica seeded from the scene catalog.
    pub fn new(
        participant: ParticipantId,
        catalog: impl IntoIterator<Item = InteractableObject>,
    ) -> Self {
        Self {
            participant,
            registry: ObjectRegistry::from_objects(catalog),
            seats: BTreeMap::new(),
            applier: ReplicaApplier::new(),
        }
    }

    /// Participant owning this replica.
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Replicated object state.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Sequencing state of the replica.
    pub fn applier(&self) -> &ReplicaApplier {
        &self.applier
    }

    /// Occupant of each taken slot of a seat group, as last replicated.
    pub fn seats(&self, group: ObjectId) -> BTreeMap<usize, ParticipantId> {
        self.seats.get(&group).cloned().unwrap_or_default()
    }

    /// Apply a join replay. Returns the events that took effect.
    pub fn apply_replay(&mut self, replay: &JoinReplay) -> Vec<ReplicatedEvent> {
        let mut applied = Vec::with_capacity(replay.len());
        for event in &replay.events {
            match self.apply(event) {
                Ok(()) => applied.push(*event),
                Err(err) => tracing::warn!(error = %err, "replayed event dropped"),
            }
        }
        self.applier.seed(replay);
        applied
    }

    /// Order an incoming event and apply whatever became ready.
    pub fn receive(
        &mut self,
        event: ReplicatedEvent,
    ) -> Result<Vec<ReplicatedEvent>, ReplicationError> {
        let ready = self.applier.accept(event)?;
        let mut applied = Vec::with_capacity(ready.len());
        for event in ready {
            match self.apply(&event) {
                Ok(()) => applied.push(event),
                Err(err @ ReplicationError::MissingReference(_)) => {
                    tracing::warn!(error = %err, "event dropped");
                }
                Err(err) => {
                    tracing::debug!(error = %err, "event discarded");
                }
            }
        }
        Ok(applied)
    }

    /// Drain everything currently queued on a subscription, reliable first.
    /// Stale and invalid events are discarded.
    pub fn drain(&mut self, subscription: &Subscription) -> Vec<ReplicatedEvent> {
        let incoming: Vec<ReplicatedEvent> = subscription
            .reliable
            .try_iter()
            .chain(subscription.unreliable.try_iter())
            .collect();
        let mut applied = Vec::new();
        for event in incoming {
            match self.receive(event) {
                Ok(events) => applied.extend(events),
                Err(err) => tracing::trace!(error = %err, "incoming event discarded"),
            }
        }
        applied
    }

    fn apply(&mut self, event: &ReplicatedEvent) -> Result<(), ReplicationError> {
        let object = event.object;
        if let EventPayload::Seat {
            index, occupant, ..
        } = event.payload
        {
            if !self.registry.contains(object) {
                return Err(ReplicationError::MissingReference(object));
            }
            let group = self.seats.entry(object).or_default();
            match occupant {
                Some(p) => {
                    group.insert(index, p);
                }
                None => {
                    group.remove(&index);
                }
            }
            return Ok(());
        }

        self.registry
            .with_object_mut(object, |obj| apply_to_object(obj, event))
            .unwrap_or(Err(ReplicationError::MissingReference(object)))
    }
}

/// Apply one event's effect to an object record.
pub fn apply_to_object(
    obj: &mut InteractableObject,
    event: &ReplicatedEvent,
) -> Result<(), ReplicationError> {
    match (event.kind, event.payload) {
        (EventKind::Grab | EventKind::Release, EventPayload::Ownership { owner, tick, rest }) => {
            match owner {
                Some(participant) => {
                    obj.owner = Some(OwnershipRecord {
                        object: obj.id,
                        participant,
                        acquired_tick: tick,
                    });
                    obj.physics.suspend(AxisLocks::for_category(obj.category));
                }
                None => {
                    obj.owner = None;
                    obj.physics.restore();
                }
            }
            if let Some(rest) = rest {
                obj.transform = rest;
            }
        }
        (EventKind::Toggle, EventPayload::Toggle { on, swing_to }) => {
            obj.toggled = on;
            if let Some(rotation) = swing_to {
                obj.transform.rotation = rotation;
            }
        }
        (EventKind::Rotate, EventPayload::Rotation { yaw_degrees }) => {
            obj.transform = obj.transform.with_yaw_degrees(yaw_degrees);
        }
        (EventKind::Scale, EventPayload::Scale { factor }) => {
            obj.transform = obj.transform.with_uniform_scale(factor);
        }
        (EventKind::Move, EventPayload::Pose(pose)) => {
            if !obj.is_owned_by(event.origin) {
                return Err(ReplicationError::NotOwner {
                    object: obj.id,
                    origin: event.origin,
                });
            }
            obj.transform = pose;
        }
        (kind, payload) => {
            tracing::warn!(object = %obj.id, ?kind, ?payload, "mismatched event payload ignored");
        }
    }
    Ok(())
}
