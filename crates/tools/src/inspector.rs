use std::fmt;

use glam::EulerRot;
use roomspace_common::{Category, ObjectId, ParticipantId};
use roomspace_kernel::InteractableObject;
use roomspace_room::{Role, Room};
use serde::Serialize;

/// Room inspector for developer tooling.
///
/// Read-only queries against a room for debugging and the CLI.
pub struct RoomInspector;

impl RoomInspector {
    /// Produce a summary of the room state.
    pub fn summary(room: &Room) -> RoomSummary {
        let participants = room
            .participants()
            .into_iter()
            .filter_map(|p| room.session(p))
            .map(|s| ParticipantInfo {
                id: s.id,
                role: s.role,
                owned: s.owned.iter().copied().collect(),
                seat: s.seat,
                envelope_height: s.envelope.height,
            })
            .collect();
        let seat_groups = room
            .seating()
            .groups()
            .into_iter()
            .map(|g| SeatGroupInfo {
                name: Self::name_of(room, g.object),
                object: g.object,
                occupants: g.slots.iter().map(|s| s.occupant).collect(),
            })
            .collect();
        RoomSummary {
            tick: room.current_tick(),
            tie_breaker: room.tie_breaker(),
            participants,
            objects: room.registry().snapshot().iter().map(ObjectInfo::from).collect(),
            seat_groups,
            subscribers: room.channel().subscriber_count(),
            state_hash: room.registry().state_hash(),
        }
    }

    /// Details of one object, if it is in the room.
    pub fn inspect_object(room: &Room, id: ObjectId) -> Option<ObjectInfo> {
        room.registry().read(id, |o| ObjectInfo::from(o))
    }

    /// Pretty-printed JSON of the summary.
    pub fn to_json(room: &Room) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::summary(room))
    }

    fn name_of(room: &Room, id: ObjectId) -> String {
        room.registry()
            .read(id, |o| o.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub tick: u64,
    pub tie_breaker: Option<ParticipantId>,
    pub participants: Vec<ParticipantInfo>,
    pub objects: Vec<ObjectInfo>,
    pub seat_groups: Vec<SeatGroupInfo>,
    pub subscribers: usize,
    pub state_hash: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub role: Role,
    pub owned: Vec<ObjectId>,
    pub seat: Option<(ObjectId, usize)>,
    pub envelope_height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub name: String,
    pub category: Category,
    pub capabilities: Vec<String>,
    pub owner: Option<ParticipantId>,
    pub toggled: bool,
    pub position: [f32; 3],
    pub yaw_degrees: f32,
    pub scale: f32,
}

impl From<&InteractableObject> for ObjectInfo {
    fn from(obj: &InteractableObject) -> Self {
        let t = obj.transform;
        let (yaw, _, _) = t.rotation.to_euler(EulerRot::YXZ);
        Self {
            id: obj.id,
            name: obj.name.clone(),
            category: obj.category,
            capabilities: obj.capabilities().iter().map(|c| c.to_string()).collect(),
            owner: obj.owner_id(),
            toggled: obj.toggled,
            position: t.position.to_array(),
            yaw_degrees: yaw.to_degrees(),
            scale: t.scale.x,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatGroupInfo {
    pub object: ObjectId,
    pub name: String,
    pub occupants: Vec<Option<ParticipantId>>,
}

impl fmt::Display for RoomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tie_breaker = self
            .tie_breaker
            .map_or_else(|| "none".to_owned(), |p| p.to_string());
        writeln!(
            f,
            "Room: tick={} participants={} objects={} subscribers={} tie_breaker={} hash={:#018x}",
            self.tick,
            self.participants.len(),
            self.objects.len(),
            self.subscribers,
            tie_breaker,
            self.state_hash
        )?;
        for p in &self.participants {
            write!(f, "  {} {:?} owns={}", p.id, p.role, p.owned.len())?;
            if let Some((group, index)) = p.seat {
                write!(f, " seat={group}#{index}")?;
            }
            writeln!(f)?;
        }
        for object in &self.objects {
            writeln!(f, "  {object}")?;
        }
        for group in &self.seat_groups {
            let slots: Vec<String> = group
                .occupants
                .iter()
                .map(|o| o.map_or_else(|| "-".to_owned(), |p| p.to_string()))
                .collect();
            writeln!(f, "  seats {} [{}]", group.name, slots.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {:?} pos=({:.2}, {:.2}, {:.2}) yaw={:.1} scale={:.2}",
            self.name,
            self.id,
            self.category,
            self.position[0],
            self.position[1],
            self.position[2],
            self.yaw_degrees,
            self.scale,
        )?;
        if self.toggled {
            write!(f, " on")?;
        }
        if let Some(owner) = self.owner {
            write!(f, " held-by={owner}")?;
        }
        Ok(())
    }
}
