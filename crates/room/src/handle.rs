use std::sync::Arc;

use glam::Vec2;
use roomspace_common::{ObjectId, ParticipantId, Transform};
use roomspace_interact::InteractionBackend;
use roomspace_input::SliderKind;

use crate::error::RoomError;
use crate::room::Room;

/// One participant's connection to a [`Room`]. Every call is made on behalf
/// of that participant.
#[derive(Debug, Clone)]
pub struct ParticipantHandle {
    room: Arc<Room>,
    id: ParticipantId,
}

impl ParticipantHandle {
    pub(crate) fn new(room: Arc<Room>, id: ParticipantId) -> Self {
        Self { room, id }
    }

    /// Participant this handle acts for.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// The room requests go to.
    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }
}

impl InteractionBackend for ParticipantHandle {
    type Error = RoomError;

    fn participant(&self) -> ParticipantId {
        self.id
    }

    fn request_grab(&self, object: ObjectId) -> Result<(), RoomError> {
        self.room.request_grab(self.id, object).map(|_| ())
    }

    fn release_grab(&self, object: ObjectId) -> Result<(), RoomError> {
        self.room.release_grab(self.id, object)
    }

    fn update_held_pose(&self, object: ObjectId, pose: Transform) -> Result<(), RoomError> {
        self.room.update_held_pose(self.id, object, pose)
    }

    fn toggle(&self, object: ObjectId) -> Result<bool, RoomError> {
        self.room.toggle_interaction(self.id, object)
    }

    fn set_transform_param(&self, object: ObjectId, kind: SliderKind, value: f32) -> Result<(), RoomError> {
        self.room
            .set_transform_param(self.id, object, kind, value)
            .map(|_| ())
    }

    fn request_sit(&self, group: ObjectId) -> Result<usize, RoomError> {
        self.room.request_sit(self.id, group)
    }

    fn stand(&self, group: ObjectId) -> Result<(), RoomError> {
        self.room.stand(self.id, group).map(|_| ())
    }

    fn movement_input(&self, axis: Vec2) -> Result<Option<ObjectId>, RoomError> {
        self.room.movement_input(self.id, axis)
    }
}
