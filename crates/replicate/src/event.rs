use glam::Quat;
use roomspace_common::{ObjectId, ParticipantId, Transform};
use serde::{Deserialize, Serialize};

/// How an event travels to participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Queued, ordered per object, replayed to late joiners.
    BufferedReliable,
    /// Sent every tick, may be lost or reordered, never replayed.
    ContinuousUnreliable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Grab,
    Release,
    Toggle,
    Rotate,
    Scale,
    Sit,
    Stand,
    /// Live pose of a held object.
    Move,
}

impl EventKind {
    /// How events of this kind travel.
    pub fn delivery_mode(self) -> DeliveryMode {
        match self {
            Self::Move => DeliveryMode::ContinuousUnreliable,
            _ => DeliveryMode::BufferedReliable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Grab (`owner` set) or release (`owner` cleared, `rest` is where the
    /// object was freed).
    Ownership {
        owner: Option<ParticipantId>,
        tick: u64,
        rest: Option<Transform>,
    },
    /// New toggle state. Doors carry the rotation they swing to.
    Toggle { on: bool, swing_to: Option<Quat> },
    Rotation { yaw_degrees: f32 },
    Scale { factor: f32 },
    /// Seat slot change. `occupant` is cleared on stand; `anchor` is the
    /// pose a sitting participant snaps to.
    Seat {
        index: usize,
        occupant: Option<ParticipantId>,
        anchor: Option<Transform>,
    },
    Pose(Transform),
}

/// The part of an object's state an event overwrites. A late joiner only
/// needs the latest reliable event per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateSlot {
    Ownership,
    Toggle,
    Rotation,
    Scale,
    Seat(usize),
}

/// An event before the channel stamps it with a sequence number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDraft {
    pub object: ObjectId,
    pub kind: EventKind,
    pub payload: EventPayload,
    pub origin: ParticipantId,
}

impl EventDraft {
    /// Describe an event about `object` caused by `origin`.
    pub fn new(
        object: ObjectId,
        kind: EventKind,
        payload: EventPayload,
        origin: ParticipantId,
    ) -> Self {
        Self {
            object,
            kind,
            payload,
            origin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedEvent {
    pub object: ObjectId,
    pub kind: EventKind,
    pub payload: EventPayload,
    pub mode: DeliveryMode,
    pub origin: ParticipantId,
    /// Per object, per delivery mode. Starts at 1.
    pub seq: u64,
}

impl ReplicatedEvent {
    /// True for buffered reliable events.
    pub fn is_reliable(&self) -> bool {
        self.mode == DeliveryMode::BufferedReliable
    }

    /// Slot this event overwrites, `None` for streamed poses.
    pub fn slot(&self) -> Option<StateSlot> {
        match (self.kind, self.payload) {
            (EventKind::Grab | EventKind::Release, _) => Some(StateSlot::Ownership),
            (EventKind::Toggle, _) => Some(StateSlot::Toggle),
            (EventKind::Rotate, _) => Some(StateSlot::Rotation),
            (EventKind::Scale, _) => Some(StateSlot::Scale),
            (EventKind::Sit | EventKind::Stand, EventPayload::Seat { index, .. }) => {
                Some(StateSlot::Seat(index))
            }
            (EventKind::Sit | EventKind::Stand, _) | (EventKind::Move, _) => None,
        }
    }
}
