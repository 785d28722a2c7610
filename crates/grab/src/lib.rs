//! Grab/Release Session: moves a held object in front of its holder.
//!
//! # Invariants
//! - While a session is active the object's physics is `Controlled`.
//! - Ending a session restores physics and leaves the object where it is.
//! - `Heavy` objects never change height while held.

use glam::Vec3;
use roomspace_common::{Category, ObjectId, Transform};
use roomspace_kernel::{AxisLocks, InteractableObject};
use serde::{Deserialize, Serialize};

/// Blend rates per movement class, in 1/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabTuning {
    pub light_rate: f32,
    pub heavy_rate: f32,
}

impl Default for GrabTuning {
    fn default() -> Self {
        Self {
            light_rate: 10.0,
            heavy_rate: 1.0,
        }
    }
}

impl GrabTuning {
    /// Smoothing rate and axis locks for a held object of `category`.
    pub fn profile(&self, category: Category) -> SmoothingProfile {
        match category {
            Category::Heavy => SmoothingProfile {
                rate: self.heavy_rate,
                locks: AxisLocks::PLANAR,
            },
            _ => SmoothingProfile {
                rate: self.light_rate,
                locks: AxisLocks::NONE,
            },
        }
    }
}

/// How a held object follows its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingProfile {
    pub rate: f32,
    pub locks: AxisLocks,
}

impl SmoothingProfile {
    /// Fraction of the remaining distance covered in one step.
    pub fn blend(&self, dt: f32) -> f32 {
        (self.rate * dt).clamp(0.0, 1.0)
    }
}

/// Local state of one held object.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabSession {
    object: ObjectId,
    hold_distance: f32,
    profile: SmoothingProfile,
}

impl GrabSession {
    /// Start holding `obj` from `reference`. Suspends the object's physics
    /// and records the current distance as the hold distance.
    pub fn begin(obj: &mut InteractableObject, reference: Vec3, tuning: &GrabTuning) -> Self {
        let profile = tuning.profile(obj.category);
        obj.physics.suspend(profile.locks);
        let hold_distance = reference.distance(obj.transform.position);
        tracing::debug!(object = %obj.id, hold_distance, "grab session started");
        Self {
            object: obj.id,
            hold_distance,
            profile,
        }
    }

    /// The held object.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Distance from the view origin the object is kept at.
    pub fn hold_distance(&self) -> f32 {
        self.hold_distance
    }

    /// Smoothing profile chosen when the grab began.
    pub fn profile(&self) -> SmoothingProfile {
        self.profile
    }

    /// Where the object should be held for this reference point and facing.
    pub fn target(&self, current: Vec3, reference: Vec3, forward: Vec3) -> Vec3 {
        let mut target = reference + forward.normalize_or_zero() * self.hold_distance;
        if self.profile.locks.position_y {
            target.y = current.y;
        }
        target
    }

    /// One smoothing step. Returns the pose to stream for this tick.
    pub fn step(&self, current: Transform, reference: Vec3, forward: Vec3, dt: f32) -> Transform {
        let target = self.target(current.position, reference, forward);
        let position = current.position.lerp(target, self.profile.blend(dt));
        tracing::trace!(object = %self.object, ?position, "held pose");
        Transform {
            position,
            ..current
        }
    }

    /// Stop holding. Physics is restored; the object stays where it is.
    pub fn end(self, obj: &mut InteractableObject) {
        obj.physics.restore();
        tracing::debug!(object = %self.object, "grab session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomspace_kernel::PhysicsMode;

    fn object_at(category: Category, position: Vec3) -> InteractableObject {
        InteractableObject::new("thing", category).at(Transform::from_position(position))
    }

    #[test]
    fn begin_records_distance_and_suspends() {
        let mut obj = object_at(Category::Light, Vec3::new(0.0, 1.0, 3.0));
        let session = GrabSession::begin(&mut obj, Vec3::new(0.0, 1.0, 0.0), &GrabTuning::default());
        assert!((session.hold_distance() - 3.0).abs() < 1e-6);
        assert_eq!(obj.physics.mode, PhysicsMode::Controlled);
        assert_eq!(obj.physics.locks, AxisLocks::NONE);
    }

    #[test]
    fn heavy_freezes_vertical_and_tilt() {
        let mut obj = object_at(Category::Heavy, Vec3::new(0.0, 0.5, 2.0));
        let session = GrabSession::begin(&mut obj, Vec3::ZERO, &GrabTuning::default());
        assert_eq!(obj.physics.locks, AxisLocks::PLANAR);

        let pose = session.step(obj.transform, Vec3::new(0.0, 3.0, 0.0), Vec3::Z, 0.5);
        assert_eq!(pose.position.y, 0.5);
    }

    #[test]
    fn light_blend_is_fast_and_clamped() {
        let mut obj = object_at(Category::Light, Vec3::new(0.0, 0.0, 2.0));
        let session = GrabSession::begin(&mut obj, Vec3::ZERO, &GrabTuning::default());

        // 10/s * 0.05s = half way.
        let pose = session.step(obj.transform, Vec3::ZERO, Vec3::X, 0.05);
        assert!((pose.position - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-5);

        // A long frame snaps to the target rather than overshooting.
        let pose = session.step(obj.transform, Vec3::ZERO, Vec3::X, 1.0);
        assert!((pose.position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn heavy_blend_is_slow() {
        let tuning = GrabTuning::default();
        let heavy = tuning.profile(Category::Heavy);
        let light = tuning.profile(Category::Light);
        assert!(heavy.blend(0.02) < light.blend(0.02));
        assert_eq!(heavy.blend(-1.0), 0.0);
    }

    #[test]
    fn zero_forward_targets_reference() {
        let mut obj = object_at(Category::Light, Vec3::new(0.0, 0.0, 2.0));
        let session = GrabSession::begin(&mut obj, Vec3::ZERO, &GrabTuning::default());
        assert_eq!(session.target(obj.transform.position, Vec3::ONE, Vec3::ZERO), Vec3::ONE);
    }

    #[test]
    fn end_restores_in_place() {
        let mut obj = object_at(Category::Light, Vec3::new(4.0, 1.0, 0.0));
        let session = GrabSession::begin(&mut obj, Vec3::ZERO, &GrabTuning::default());
        obj.transform = session.step(obj.transform, Vec3::ZERO, Vec3::Z, 0.1);
        let held_at = obj.transform;
        session.end(&mut obj);
        assert!(!obj.physics.is_controlled());
        assert_eq!(obj.transform, held_at);
    }
}
