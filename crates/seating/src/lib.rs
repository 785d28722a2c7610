//! Seating Arbitration: mutually exclusive occupancy of seat slots.
//!
//! # Invariants
//! - A slot holds at most one participant.
//! - A participant occupies at most one slot across all groups.
//! - Free slots are handed out in index order.

use dashmap::DashMap;
use glam::Vec2;
use roomspace_common::{ObjectId, ParticipantId, Transform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SeatError {
    #[error("no free seat in group {0}")]
    NoSeatAvailable(ObjectId),
    #[error("seat group {0} does not exist")]
    MissingReference(ObjectId),
}

/// Capsule dimensions of a participant's body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEnvelope {
    pub height: f32,
    pub center_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatTuning {
    /// Axis magnitude above which movement input stands a seated participant.
    pub movement_threshold: f32,
    pub standing: CollisionEnvelope,
    pub seated: CollisionEnvelope,
}

impl Default for SeatTuning {
    fn default() -> Self {
        Self {
            movement_threshold: 0.1,
            standing: CollisionEnvelope {
                height: 1.8,
                center_y: 0.9,
            },
            seated: CollisionEnvelope {
                height: 0.6,
                center_y: 0.3,
            },
        }
    }
}

impl SeatTuning {
    /// True when `axis` is strong enough to stand a seated participant up.
    pub fn is_movement(&self, axis: Vec2) -> bool {
        axis.x.abs() > self.movement_threshold || axis.y.abs() > self.movement_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatSlot {
    pub index: usize,
    pub occupant: Option<ParticipantId>,
    /// Pose a participant snaps to when sitting here.
    pub anchor: Transform,
}

/// The slots belonging to one sittable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatGroup {
    pub object: ObjectId,
    pub slots: Vec<SeatSlot>,
}

impl SeatGroup {
    /// A group on `object` with one free slot per anchor.
    pub fn new(object: ObjectId, anchors: impl IntoIterator<Item = Transform>) -> Self {
        let slots = anchors
            .into_iter()
            .enumerate()
            .map(|(index, anchor)| SeatSlot {
                index,
                occupant: None,
                anchor,
            })
            .collect();
        Self { object, slots }
    }

    /// Number of occupied slots.
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|s| s.occupant.is_some()).count()
    }

    /// Slot held by `participant`.
    pub fn slot_of(&self, participant: ParticipantId) -> Option<&SeatSlot> {
        self.slots.iter().find(|s| s.occupant == Some(participant))
    }
}

/// A granted seat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seated {
    pub group: ObjectId,
    pub index: usize,
    pub anchor: Transform,
    /// False when the participant was already sitting in this slot.
    pub fresh: bool,
}

/// A freed seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vacated {
    pub group: ObjectId,
    pub index: usize,
}

/// A slot changing hands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeatChange {
    Seated(Seated),
    Vacated(Vacated),
}

/// Arbitrates every seat group of a room. Each group is locked on its own,
/// so sitting in different groups never contends.
#[derive(Debug, Default)]
pub struct SeatingArbiter {
    groups: DashMap<ObjectId, SeatGroup>,
    seated: DashMap<ParticipantId, (ObjectId, usize)>,
}

impl SeatingArbiter {
    /// An arbiter with no seat groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `group`, replacing any group on the same object.
    pub fn add_group(&self, group: SeatGroup) {
        tracing::debug!(group = %group.object, slots = group.slots.len(), "seat group added");
        self.groups.insert(group.object, group);
    }

    /// Copy of the seat group on `object`.
    pub fn group(&self, object: ObjectId) -> Option<SeatGroup> {
        self.groups.get(&object).map(|g| g.value().clone())
    }

    /// All groups in canonical order.
    pub fn groups(&self) -> Vec<SeatGroup> {
        let mut groups: Vec<SeatGroup> = self.groups.iter().map(|g| g.value().clone()).collect();
        groups.sort_by_key(|g| g.object);
        groups
    }

    /// Group and slot index `participant` sits in.
    pub fn seat_of(&self, participant: ParticipantId) -> Option<(ObjectId, usize)> {
        self.seated.get(&participant).map(|s| *s.value())
    }

    /// Take the first free slot of `group`.
    ///
    /// A participant already sitting in `group` keeps its slot; one sitting
    /// elsewhere stands up first.
    pub fn try_sit(&self, group: ObjectId, participant: ParticipantId) -> Result<Seated, SeatError> {
        self.try_sit_with(group, participant, |_| {})
    }

    /// [`try_sit`](Self::try_sit), calling `on_change` for every slot that
    /// changes hands while its group is still locked.
    pub fn try_sit_with(
        &self,
        group: ObjectId,
        participant: ParticipantId,
        mut on_change: impl FnMut(SeatChange),
    ) -> Result<Seated, SeatError> {
        if !self.groups.contains_key(&group) {
            return Err(SeatError::MissingReference(group));
        }
        if let Some((current, _)) = self.seat_of(participant)
            && current != group
        {
            self.stand_with(participant, |vacated| on_change(SeatChange::Vacated(vacated)));
        }

        let mut entry = self
            .groups
            .get_mut(&group)
            .ok_or(SeatError::MissingReference(group))?;
        if let Some(slot) = entry.slot_of(participant) {
            return Ok(Seated {
                group,
                index: slot.index,
                anchor: slot.anchor,
                fresh: false,
            });
        }
        let Some(slot) = entry.slots.iter_mut().find(|s| s.occupant.is_none()) else {
            tracing::debug!(group = %group, participant = %participant, "no seat available");
            return Err(SeatError::NoSeatAvailable(group));
        };
        slot.occupant = Some(participant);
        let seated = Seated {
            group,
            index: slot.index,
            anchor: slot.anchor,
            fresh: true,
        };
        self.seated.insert(participant, (group, seated.index));
        on_change(SeatChange::Seated(seated));
        drop(entry);

        tracing::info!(group = %group, participant = %participant, index = seated.index, "seated");
        Ok(seated)
    }

    /// Free whatever slot `participant` occupies. Always succeeds.
    pub fn stand(&self, participant: ParticipantId) -> Option<Vacated> {
        self.stand_with(participant, |_| {})
    }

    /// [`stand`](Self::stand), calling `on_change` while the group is still
    /// locked.
    pub fn stand_with(
        &self,
        participant: ParticipantId,
        on_change: impl FnOnce(Vacated),
    ) -> Option<Vacated> {
        let (_, (group, index)) = self.seated.remove(&participant)?;
        let vacated = Vacated { group, index };
        if let Some(mut entry) = self.groups.get_mut(&group)
            && let Some(slot) = entry.slots.get_mut(index)
            && slot.occupant == Some(participant)
        {
            slot.occupant = None;
            on_change(vacated);
        }
        tracing::info!(group = %group, participant = %participant, index, "stood up");
        Some(vacated)
    }
}
