//! Object Registry: authoritative catalog of interactable objects, their
//! category and capability tags, and current transform/toggle state.
//!
//! # Invariants
//! - At most one owner per object at any instant (the record is stored inline).
//! - Mutation happens only inside [`ObjectRegistry::with_object_mut`], which
//!   serializes callers per object and never locks the whole registry.

pub mod object;
pub mod registry;

pub use object::{AxisLocks, DoorHinge, InteractableObject, OwnershipRecord, PhysicsControl, PhysicsMode};
pub use registry::ObjectRegistry;
