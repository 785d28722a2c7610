//! Shared vocabulary for every roomspace crate: identities, spatial transforms,
//! object categories and capability sets.

pub mod capability;
pub mod types;

pub use capability::{Capability, CapabilitySet, Category};
pub use types::{ObjectId, ParticipantId, Transform};
