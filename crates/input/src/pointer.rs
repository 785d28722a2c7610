use glam::Vec3;
use roomspace_common::Transform;
use serde::{Deserialize, Serialize};

/// A pointing ray from the participant's view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized on construction.
    pub direction: Vec3,
    pub range: f32,
}

impl Ray {
    /// A ray from `origin` along `direction`, reaching `range` meters.
    pub fn new(origin: Vec3, direction: Vec3, range: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            range,
        }
    }

    /// Point `distance` meters along the ray.
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance to the box `half_extents` placed at `transform`, if it is hit
    /// within range. A ray starting inside the box hits at distance 0.
    pub fn hit(&self, transform: &Transform, half_extents: Vec3) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let inverse = transform.rotation.inverse();
        let origin = inverse * (self.origin - transform.position);
        let direction = inverse * self.direction;
        let half = half_extents * transform.scale.abs();

        let mut near = 0.0f32;
        let mut far = self.range;
        for axis in 0..3 {
            let (o, d, h) = (origin[axis], direction[axis], half[axis]);
            if d.abs() < f32::EPSILON {
                if o.abs() > h {
                    return None;
                }
                continue;
            }
            let (mut t0, mut t1) = ((-h - o) / d, (h - o) / d);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            near = near.max(t0);
            far = far.min(t1);
            if near > far {
                return None;
            }
        }
        Some(near)
    }
}

/// Pointing range presets, cycled from the settings menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RayRange {
    Short,
    #[default]
    Medium,
    Long,
}

impl RayRange {
    /// Reach of this preset.
    pub fn meters(self) -> f32 {
        match self {
            Self::Short => 1.0,
            Self::Medium => 10.0,
            Self::Long => 50.0,
        }
    }

    /// The following preset, wrapping from `Long` back to `Short`.
    pub fn next(self) -> Self {
        match self {
            Self::Short => Self::Medium,
            Self::Medium => Self::Long,
            Self::Long => Self::Short,
        }
    }
}
