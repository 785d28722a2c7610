//! Developer Tooling: a read-only inspector over a live room.
//!
//! # Invariants
//! - Inspection never takes a lock for longer than one copy and never
//!   mutates the room.

mod inspector;

pub use inspector::{ObjectInfo, ParticipantInfo, RoomInspector, RoomSummary, SeatGroupInfo};

pub fn crate_info() -> &'static str {
    concat!("roomspace-tools v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
