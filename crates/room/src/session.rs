use std::collections::BTreeSet;

use roomspace_common::{ObjectId, ParticipantId};
use roomspace_seating::CollisionEnvelope;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The room's tie-breaker.
    Authority,
    Member,
}

/// One connected participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSession {
    pub id: ParticipantId,
    pub role: Role,
    /// Position in join order; lower joined earlier.
    pub join_order: u64,
    pub owned: BTreeSet<ObjectId>,
    pub seat: Option<(ObjectId, usize)>,
    pub envelope: CollisionEnvelope,
}

impl ParticipantSession {
    /// A session with nothing held and no seat.
    pub fn new(id: ParticipantId, role: Role, join_order: u64, envelope: CollisionEnvelope) -> Self {
        Self {
            id,
            role,
            join_order,
            owned: BTreeSet::new(),
            seat: None,
            envelope,
        }
    }

    /// Whether this participant is the room's tie-breaker.
    pub fn is_authority(&self) -> bool {
        self.role == Role::Authority
    }
}
