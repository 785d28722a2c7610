use glam::Vec2;
use roomspace_common::{ObjectId, ParticipantId, Transform};
use roomspace_input::SliderKind;
use std::fmt;

/// The room as seen from one participant.
///
/// Every call is answered synchronously with a grant or a denial; nothing
/// queues or waits.
pub trait InteractionBackend {
    type Error: fmt::Display;

    fn participant(&self) -> ParticipantId;

    fn request_grab(&self, object: ObjectId) -> Result<(), Self::Error>;

    fn release_grab(&self, object: ObjectId) -> Result<(), Self::Error>;

    fn update_held_pose(&self, object: ObjectId, pose: Transform) -> Result<(), Self::Error>;

    /// Returns the new toggle state.
    fn toggle(&self, object: ObjectId) -> Result<bool, Self::Error>;

    fn set_transform_param(
        &self,
        object: ObjectId,
        kind: SliderKind,
        value: f32,
    ) -> Result<(), Self::Error>;

    /// Returns the granted slot index.
    fn request_sit(&self, group: ObjectId) -> Result<usize, Self::Error>;

    fn stand(&self, group: ObjectId) -> Result<(), Self::Error>;

    /// Locomotion input. Returns the seat group left if it stood the
    /// participant up.
    fn movement_input(&self, axis: Vec2) -> Result<Option<ObjectId>, Self::Error>;
}
