//! Room session context.
//!
//! A [`Room`] owns everything participants share: the object registry, the
//! seat groups, the replication channel and the participant sessions. It is
//! passed around explicitly; there is no process-wide instance.
//!
//! # Invariants
//! - Every mutation of shared state happens at a per-object or per-seat-group
//!   arbitration point and is published before that point is left.
//! - Locks are taken in the order session, object or seat group, replication
//!   stream.
//! - A departed participant's session is gone before its resources are
//!   swept, so nothing is granted to it afterwards.
//! - At most one participant holds the tie-breaker role.

mod config;
mod error;
mod handle;
mod reaper;
mod room;
mod scene;
mod session;

pub use config::{ConfigError, RoomConfig};
pub use error::RoomError;
pub use handle::ParticipantHandle;
pub use reaper::ReapReport;
pub use room::{Room, TransformParam};
pub use scene::Scene;
pub use session::{ParticipantSession, Role};

pub fn crate_info() -> &'static str {
    concat!("roomspace-room v", env!("CARGO_PKG_VERSION"))
}
