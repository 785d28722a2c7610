use roomspace_authority::OwnershipError;
use roomspace_common::{Capability, ObjectId, ParticipantId};
use roomspace_replicate::{ReplicationError, WireError};
use roomspace_seating::SeatError;

use crate::config::ConfigError;
use crate::room::TransformParam;

/// Any denial or failure surfaced by the room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
    #[error(transparent)]
    Seat(#[from] SeatError),
    #[error(transparent)]
    Replication(#[from] ReplicationError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("object {object} is not {capability}")]
    MissingCapability {
        object: ObjectId,
        capability: Capability,
    },
    #[error("object {0} is not in the room")]
    MissingReference(ObjectId),
    #[error("{value} is not a valid {param:?} value")]
    InvalidValue { param: TransformParam, value: f32 },
    #[error("pose for object {0} is not finite")]
    InvalidPose(ObjectId),
    #[error("{0} is not in the room")]
    UnknownParticipant(ParticipantId),
    #[error("{0} has already joined")]
    DuplicateParticipant(ParticipantId),
}

impl RoomError {
    /// True for ownership conflicts and full seat groups: the request was
    /// valid but lost to someone else.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            Self::Ownership(OwnershipError::AlreadyOwned { .. })
                | Self::Seat(SeatError::NoSeatAvailable(_))
        )
    }
}
