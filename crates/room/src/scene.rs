use glam::Vec3;
use roomspace_common::{Capability, Category, ObjectId, Transform};
use roomspace_kernel::InteractableObject;
use roomspace_schedule::DoorTuning;
use roomspace_seating::SeatGroup;
use serde::{Deserialize, Serialize};

/// The objects and seat groups a room starts with. Every participant loads
/// the same scene before applying the join replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<InteractableObject>,
    pub seat_groups: Vec<SeatGroup>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` to the catalog.
    pub fn with_object(mut self, object: InteractableObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Add a sittable object together with its slot anchors.
    pub fn with_seating(
        mut self,
        object: InteractableObject,
        anchors: impl IntoIterator<Item = Transform>,
    ) -> Self {
        self.seat_groups.push(SeatGroup::new(object.id, anchors));
        self.objects.push(object);
        self
    }

    /// Id of the first object named `name`.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().find(|o| o.name == name).map(|o| o.id)
    }

    /// A small living room: a lamp and a crate to carry, a television and a
    /// door to switch, a three-seat sofa and a wall.
    pub fn living_room(doors: &DoorTuning) -> Self {
        let at = |x: f32, y: f32, z: f32| Transform::from_position(Vec3::new(x, y, z));
        let sofa = InteractableObject::new("sofa", Category::InteractOnly)
            .with_capability(Capability::Sittable)
            .at(at(0.0, 0.4, -4.0))
            .with_half_extents(Vec3::new(1.5, 0.4, 0.5));
        let seats = (0..3).map(|i| at(-1.0 + i as f32, 0.45, -4.0));

        Self::new()
            .with_object(
                InteractableObject::new("lamp", Category::Light)
                    .with_capability(Capability::Toggleable)
                    .at(at(1.5, 0.8, -2.0))
                    .with_half_extents(Vec3::new(0.15, 0.3, 0.15)),
            )
            .with_object(
                InteractableObject::new("crate", Category::Heavy)
                    .at(at(-2.0, 0.5, -2.5)),
            )
            .with_object(
                InteractableObject::new("television", Category::InteractOnly)
                    .with_capability(Capability::Toggleable)
                    .at(at(0.0, 1.2, -6.0))
                    .with_half_extents(Vec3::new(0.8, 0.5, 0.05)),
            )
            .with_object(
                InteractableObject::new("door", Category::InteractOnly)
                    .with_capability(Capability::Door)
                    .at(at(4.0, 1.0, 0.0))
                    .with_half_extents(Vec3::new(0.05, 1.0, 0.45))
                    .with_hinge(doors.open_angle_degrees),
            )
            .with_seating(sofa, seats)
            .with_object(
                InteractableObject::new("wall", Category::Static)
                    .at(at(0.0, 1.5, -7.0))
                    .with_half_extents(Vec3::new(5.0, 1.5, 0.1)),
            )
    }
}
