use std::sync::atomic::Ordering;

use roomspace_authority::OwnershipAuthority;
use roomspace_common::{ObjectId, ParticipantId};
use roomspace_replicate::{EventKind, EventPayload};
use roomspace_seating::{SeatChange, Vacated};

use crate::error::RoomError;
use crate::room::{NO_TIE_BREAKER, Room};
use crate::session::Role;

/// What the reaper freed when a participant left.
#[derive(Debug, Clone, PartialEq)]
pub struct ReapReport {
    pub participant: ParticipantId,
    /// Objects whose ownership was revoked, in canonical order.
    pub revoked: Vec<ObjectId>,
    pub vacated: Option<Vacated>,
    /// New tie-breaker, if the departed participant held the role.
    pub promoted: Option<ParticipantId>,
}

impl Room {
    /// Sweep everything a departed participant held.
    ///
    /// The session is removed first, so requests racing with the sweep are
    /// denied rather than granted to a participant that is gone. Each object
    /// is released where it stands and the release is replicated as if the
    /// participant had let go.
    pub fn participant_left(&self, participant: ParticipantId) -> Result<ReapReport, RoomError> {
        let _span = tracing::info_span!("reap", participant = %participant).entered();
        let (_, session) = self
            .sessions
            .remove(&participant)
            .ok_or(RoomError::UnknownParticipant(participant))?;
        self.channel.unsubscribe(participant);

        let authority = OwnershipAuthority::new(&self.registry);
        let tick = self.current_tick();
        let mut revoked = Vec::new();
        for object in self.registry.owned_by(participant) {
            let outcome = authority.revoke(object, participant, |obj, _| {
                self.publish(
                    object,
                    EventKind::Release,
                    EventPayload::Ownership {
                        owner: None,
                        tick,
                        rest: Some(obj.transform),
                    },
                    participant,
                );
            });
            match outcome {
                Ok(_) => revoked.push(object),
                Err(e) => tracing::warn!(object = %object, error = %e, "revoke failed"),
            }
        }

        let vacated = self
            .seating
            .stand_with(participant, |v| self.publish_seat(SeatChange::Vacated(v), participant));

        let promoted = if session.is_authority() {
            self.promote_tie_breaker(participant)
        } else {
            None
        };

        tracing::info!(
            revoked = revoked.len(),
            vacated = vacated.is_some(),
            promoted = ?promoted,
            "participant left"
        );
        Ok(ReapReport {
            participant,
            revoked,
            vacated,
            promoted,
        })
    }

    /// Hand the tie-breaker role to the earliest-joined remaining participant.
    fn promote_tie_breaker(&self, departed: ParticipantId) -> Option<ParticipantId> {
        let next = self
            .sessions
            .iter()
            .min_by_key(|s| s.join_order)
            .map(|s| s.id);
        let value = next.map_or(NO_TIE_BREAKER, |p| p.0);
        if self
            .tie_breaker
            .compare_exchange(departed.0, value, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        let next = next?;
        if let Some(mut session) = self.sessions.get_mut(&next) {
            session.role = Role::Authority;
        }
        Some(next)
    }
}
