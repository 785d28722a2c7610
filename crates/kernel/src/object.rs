use glam::{Quat, Vec3};
use roomspace_common::{Capability, CapabilitySet, Category, ObjectId, ParticipantId, Transform};
use serde::{Deserialize, Serialize};

/// Exclusive control of one object by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub object: ObjectId,
    pub participant: ParticipantId,
    /// Room tick at which ownership was granted.
    pub acquired_tick: u64,
}

/// Who drives an object's motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Gravity and collision response apply.
    #[default]
    Simulated,
    /// Positioned externally by a holder; gravity and collision response suspended.
    Controlled,
}

/// Axes frozen while an object is controlled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLocks {
    pub position_y: bool,
    pub rotation_x: bool,
    pub rotation_z: bool,
}

impl AxisLocks {
    pub const NONE: Self = Self {
        position_y: false,
        rotation_x: false,
        rotation_z: false,
    };

    /// Vertical travel and tilt frozen; only yaw and horizontal travel remain.
    pub const PLANAR: Self = Self {
        position_y: true,
        rotation_x: true,
        rotation_z: true,
    };

    /// Locks applied while an object of `category` is held.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Heavy => Self::PLANAR,
            _ => Self::NONE,
        }
    }
}

/// Physics authority flag of an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsControl {
    pub mode: PhysicsMode,
    pub locks: AxisLocks,
}

impl PhysicsControl {
    /// Hand motion to an external holder.
    pub fn suspend(&mut self, locks: AxisLocks) {
        self.mode = PhysicsMode::Controlled;
        self.locks = locks;
    }

    /// Return the object to independent simulation.
    pub fn restore(&mut self) {
        *self = Self::default();
    }

    /// True while a participant drives the object.
    pub fn is_controlled(&self) -> bool {
        self.mode == PhysicsMode::Controlled
    }
}

/// Pivot data for objects with the `Door` capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorHinge {
    pub closed_rotation: Quat,
    pub open_angle_degrees: f32,
}

impl DoorHinge {
    /// A hinge closed at `closed_rotation` that opens by `open_angle_degrees`.
    pub fn new(closed_rotation: Quat, open_angle_degrees: f32) -> Self {
        Self {
            closed_rotation,
            open_angle_degrees,
        }
    }

    /// Rotation the door swings to for the given open state.
    pub fn target(&self, open: bool) -> Quat {
        if open {
            self.closed_rotation * Quat::from_rotation_y(self.open_angle_degrees.to_radians())
        } else {
            self.closed_rotation
        }
    }
}

/// Per-object record held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableObject {
    pub id: ObjectId,
    pub name: String,
    pub category: Category,
    /// Declared capabilities. See [`InteractableObject::capabilities`] for
    /// the effective set.
    pub declared: CapabilitySet,
    pub transform: Transform,
    /// Half extents of the interaction bounds, before scale.
    pub half_extents: Vec3,
    pub toggled: bool,
    pub owner: Option<OwnershipRecord>,
    pub physics: PhysicsControl,
    pub hinge: Option<DoorHinge>,
}

impl InteractableObject {
    /// An unowned object at the origin with a unit pick box and no declared
    /// capabilities.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            category,
            declared: CapabilitySet::empty(),
            transform: Transform::default(),
            half_extents: Vec3::splat(0.5),
            toggled: false,
            owner: None,
            physics: PhysicsControl::default(),
            hinge: None,
        }
    }

    /// Use a fixed id instead of a fresh one.
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    /// Add an explicit capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.declared.insert(capability);
        self
    }

    /// Place the object at `transform`.
    pub fn at(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the pick box half extents.
    pub fn with_half_extents(mut self, half_extents: Vec3) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Attach a hinge closed at the current rotation.
    pub fn with_hinge(mut self, open_angle_degrees: f32) -> Self {
        self.hinge = Some(DoorHinge::new(self.transform.rotation, open_angle_degrees));
        self
    }

    /// Declared plus category-implied capabilities.
    pub fn capabilities(&self) -> CapabilitySet {
        self.declared.union(self.category.implied_capabilities())
    }

    /// True when `capability` is among the effective capabilities.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Participant holding the object, if any.
    pub fn owner_id(&self) -> Option<ParticipantId> {
        self.owner.map(|r| r.participant)
    }

    /// True when `participant` holds the object.
    pub fn is_owned_by(&self, participant: ParticipantId) -> bool {
        self.owner_id() == Some(participant)
    }
}
