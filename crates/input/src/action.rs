use glam::Vec2;
use roomspace_common::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pointer::Ray;

/// An entry in an object's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MenuAction {
    Grab,
    Toggle,
    Sit,
    Rotate,
    Scale,
    Exit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Grab => "Grab",
            Self::Toggle => "Toggle",
            Self::Sit => "Sit",
            Self::Rotate => "Rotate",
            Self::Scale => "Scale",
            Self::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// Which transform parameter a menu slider drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliderKind {
    /// Yaw in degrees.
    Rotation,
    /// Uniform scale factor.
    Scale,
}

/// A high-level intent produced by any embodiment mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// The participant's pointing ray this frame.
    Point(Ray),
    /// Open (or close) the menu of the highlighted object.
    Activate,
    /// Pick an entry from the open menu of `object`.
    Choose { object: ObjectId, action: MenuAction },
    /// Nudge the selected slider of `object` by a horizontal axis value held
    /// for `dt` seconds.
    Adjust {
        object: ObjectId,
        kind: SliderKind,
        axis: f32,
        dt: f32,
    },
    /// Drop whatever is held.
    Release,
    /// Locomotion axes.
    Move(Vec2),
    /// Leave the current interaction of `object`.
    Exit(ObjectId),
}

impl MenuAction {
    /// Slider driven by this menu entry, if any.
    pub fn slider(self) -> Option<SliderKind> {
        match self {
            Self::Rotate => Some(SliderKind::Rotation),
            Self::Scale => Some(SliderKind::Scale),
            _ => None,
        }
    }
}

impl From<SliderKind> for MenuAction {
    fn from(kind: SliderKind) -> Self {
        match kind {
            SliderKind::Rotation => Self::Rotate,
            SliderKind::Scale => Self::Scale,
        }
    }
}
