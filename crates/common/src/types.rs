use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an interactable object in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.to_string();
        f.write_str(&s[..8])
    }
}

/// Connection id of a participant, assigned by the hosting session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity rotation and unit scale at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Same transform with the rotation replaced by a yaw about +Y.
    pub fn with_yaw_degrees(self, degrees: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_y(degrees.to_radians()),
            ..self
        }
    }

    /// Same transform with a uniform scale factor.
    pub fn with_uniform_scale(self, factor: f32) -> Self {
        Self {
            scale: Vec3::splat(factor),
            ..self
        }
    }

    /// True when no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn object_id_display_is_short() {
        let id = ObjectId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn participant_display() {
        assert_eq!(ParticipantId(7).to_string(), "p7");
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn yaw_and_scale_helpers() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_yaw_degrees(90.0)
            .with_uniform_scale(2.0);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
        let forward = t.rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn non_finite_components_are_detected() {
        assert!(Transform::default().is_finite());
        assert!(!Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_finite());
        let spun = Transform {
            rotation: Quat::from_xyzw(0.0, f32::INFINITY, 0.0, 1.0),
            ..Transform::default()
        };
        assert!(!spun.is_finite());
        assert!(!Transform::default().with_uniform_scale(f32::NEG_INFINITY).is_finite());
    }
}
