//! Participant input mapped to interaction intents.
//!
//! Raw devices (mouse, gamepad, head gaze) are translated into [`Action`]s by
//! the embodiment layer; everything downstream consumes actions only.
//!
//! # Invariants
//! - Desktop and head-mounted input produce the same action set.
//! - A pointing ray only hits within its configured range.

pub mod action;
pub mod pointer;
pub mod slider;

pub use action::{Action, MenuAction, SliderKind};
pub use pointer::{Ray, RayRange};
pub use slider::{Slider, SliderTuning};
