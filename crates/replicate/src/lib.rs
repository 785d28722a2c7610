//! Replication: propagates object state changes to every participant.
//!
//! Two delivery modes, chosen per event kind:
//! - buffered-reliable: ordered per object, replayed to late joiners;
//! - continuous-unreliable: latest wins, no replay, may be dropped.
//!
//! # Invariants
//! - Sequence numbers are per object and per delivery mode, starting at 1.
//! - A replica applies reliable events of one object in sequence order,
//!   holding back early arrivals until the gap fills.
//! - A replica never applies an unreliable event older than the last one it
//!   applied for the same object.

mod applier;
mod channel;
mod event;
mod replica;
mod wire;

pub use applier::ReplicaApplier;
pub use channel::{JoinReplay, ReplicationChannel, ReplicationTuning, Subscription};
pub use event::{DeliveryMode, EventDraft, EventKind, EventPayload, ReplicatedEvent, StateSlot};
pub use replica::{Replica, apply_to_object};
pub use wire::{WireError, decode_event, encode_event};

use roomspace_common::{ObjectId, ParticipantId};

/// Why an incoming event was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationError {
    #[error("event {seq} for object {object} is older than last applied {last}")]
    StaleSequence { object: ObjectId, seq: u64, last: u64 },
    #[error("event refers to object {0} which is not present")]
    MissingReference(ObjectId),
    #[error("pose for object {object} from {origin}, who does not own it")]
    NotOwner {
        object: ObjectId,
        origin: ParticipantId,
    },
}
