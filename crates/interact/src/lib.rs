//! Interaction State Machine: what a participant is doing with each object.
//!
//! Each object a participant touches has its own [`InteractionMachine`]:
//! `Idle → Highlighted → MenuOpen → {Held | Toggled | Occupied} → Idle`.
//! The [`Interactor`] drives those machines from input [`Action`]s, asks the
//! room for ownership and seats through an [`InteractionBackend`], and keeps
//! them in step with replicated events.
//!
//! # Invariants
//! - `Static` objects never leave `Idle`.
//! - `Held` is entered only after the room granted ownership; `Occupied` only
//!   after it granted a seat.
//! - A denied request leaves the machine in `MenuOpen` and is not retried.
//!
//! [`Action`]: roomspace_input::Action

mod backend;
mod handler;
mod interactor;
mod machine;
mod menu;

pub use backend::InteractionBackend;
pub use handler::{HandlerTable, ToggleEffect, ToggleHandler};
pub use interactor::{Interactor, InteractorTuning};
pub use machine::{InteractionMachine, InteractionState, InvalidTransition, MachineEvent};
pub use menu::{InteractionSignal, InteractionTuning, menu_for};
pub use roomspace_input::MenuAction;
