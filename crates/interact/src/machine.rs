use roomspace_common::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionState {
    #[default]
    Idle,
    Highlighted,
    MenuOpen,
    Held,
    Toggled,
    Occupied,
}

impl InteractionState {
    /// Held, toggled or occupied.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Held | Self::Toggled | Self::Occupied)
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Inputs to an [`InteractionMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    PointedAt,
    PointedAway,
    /// Open the menu, or close it if already open.
    Activate,
    /// The room granted ownership.
    Granted,
    /// The room accepted a toggle.
    Toggled,
    /// The room granted a seat.
    Seated,
    Exit,
    /// Ownership was released or revoked elsewhere.
    OwnershipLost,
    /// Our seat was freed elsewhere.
    SeatLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not valid in state {from}")]
pub struct InvalidTransition {
    pub from: InteractionState,
    pub event: MachineEvent,
}

/// Interaction state of one object from one participant's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionMachine {
    object: ObjectId,
    state: InteractionState,
}

impl InteractionMachine {
    /// A machine for `object`, starting idle.
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            state: InteractionState::Idle,
        }
    }

    /// The object this machine tracks.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Current state.
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Apply `event`. On success returns the new state; an invalid event
    /// leaves the machine untouched.
    pub fn apply(&mut self, event: MachineEvent) -> Result<InteractionState, InvalidTransition> {
        use InteractionState as S;
        use MachineEvent as E;

        let next = match (self.state, event) {
            (S::Idle, E::PointedAt) => S::Highlighted,
            (S::Highlighted, E::PointedAway) => S::Idle,
            (S::Highlighted, E::Activate) => S::MenuOpen,
            (S::MenuOpen, E::Activate) => S::Idle,
            (S::MenuOpen, E::Granted) => S::Held,
            (S::MenuOpen | S::Toggled, E::Toggled) => S::Toggled,
            (S::MenuOpen, E::Seated) => S::Occupied,
            (S::Held, E::OwnershipLost) | (S::Occupied, E::SeatLost) => S::Idle,
            (S::MenuOpen | S::Held | S::Toggled | S::Occupied, E::Exit) => S::Idle,
            // Re-pointing at an object already being used changes nothing.
            (state, E::PointedAt | E::PointedAway) if state != S::Idle => state,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        if next != self.state {
            tracing::debug!(object = %self.object, from = %self.state, to = %next, "interaction state");
        }
        self.state = next;
        Ok(next)
    }
}
