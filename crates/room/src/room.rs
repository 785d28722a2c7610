use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use glam::{EulerRot, Quat, Vec2};
use roomspace_authority::{Grant, OwnershipAuthority, OwnershipError};
use roomspace_common::{Capability, ObjectId, ParticipantId, Transform};
use roomspace_input::SliderKind;
use roomspace_interact::{HandlerTable, Interactor};
use roomspace_kernel::ObjectRegistry;
use roomspace_replicate::{
    EventDraft, EventKind, EventPayload, ReplicatedEvent, ReplicationChannel, Subscription,
    apply_to_object,
};
use roomspace_seating::{SeatChange, SeatError, SeatingArbiter, Vacated};

use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::handle::ParticipantHandle;
use crate::scene::Scene;
use crate::session::{ParticipantSession, Role};

/// Which transform parameter `set_transform_param` changes.
pub type TransformParam = SliderKind;

/// Smallest uniform scale an object can be set to.
const MIN_SCALE: f32 = 0.01;

pub(crate) const NO_TIE_BREAKER: u64 = u64::MAX;

/// Shared state of one room and the RPC surface participants call.
#[derive(Debug)]
pub struct Room {
    pub(crate) config: RoomConfig,
    pub(crate) scene: Scene,
    pub(crate) registry: ObjectRegistry,
    pub(crate) seating: SeatingArbiter,
    pub(crate) channel: ReplicationChannel,
    pub(crate) sessions: DashMap<ParticipantId, ParticipantSession>,
    pub(crate) handlers: HandlerTable,
    pub(crate) tick: AtomicU64,
    pub(crate) joins: AtomicU64,
    pub(crate) tie_breaker: AtomicU64,
}

impl Room {
    /// A room over `scene` with no participants, seeded with the scene's
    /// objects and seat groups.
    pub fn new(config: RoomConfig, scene: Scene) -> Self {
        let registry = ObjectRegistry::from_objects(scene.objects.iter().cloned());
        let seating = SeatingArbiter::new();
        for group in &scene.seat_groups {
            seating.add_group(group.clone());
        }
        let channel = ReplicationChannel::new(config.replication.clone());
        tracing::info!(
            objects = registry.len(),
            seat_groups = scene.seat_groups.len(),
            "room created"
        );
        Self {
            config,
            scene,
            registry,
            seating,
            channel,
            sessions: DashMap::new(),
            handlers: HandlerTable::default(),
            tick: AtomicU64::new(0),
            joins: AtomicU64::new(0),
            tie_breaker: AtomicU64::new(NO_TIE_BREAKER),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Catalog the room was built from.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Authoritative object state.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Seat groups and their occupants.
    pub fn seating(&self) -> &SeatingArbiter {
        &self.seating
    }

    /// Replication channel feeding every participant.
    pub fn channel(&self) -> &ReplicationChannel {
        &self.channel
    }

    /// Current simulation tick.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    /// Advance the room clock. Returns the new tick.
    pub fn advance_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Copy of the session of `participant`.
    pub fn session(&self, participant: ParticipantId) -> Option<ParticipantSession> {
        self.sessions.get(&participant).map(|s| s.value().clone())
    }

    /// Connected participants in join order.
    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut sessions: Vec<(u64, ParticipantId)> = self
            .sessions
            .iter()
            .map(|s| (s.join_order, s.id))
            .collect();
        sessions.sort();
        sessions.into_iter().map(|(_, id)| id).collect()
    }

    /// Participant holding the tie-breaker role.
    pub fn tie_breaker(&self) -> Option<ParticipantId> {
        match self.tie_breaker.load(Ordering::SeqCst) {
            NO_TIE_BREAKER => None,
            id => Some(ParticipantId(id)),
        }
    }

    /// Register a participant and hand back its end of the replication
    /// channel, starting with the replay of the room's current state. The
    /// first participant in an empty room becomes the tie-breaker.
    pub fn participant_joined(&self, participant: ParticipantId) -> Result<Subscription, RoomError> {
        let subscription = match self.sessions.entry(participant) {
            Entry::Occupied(_) => return Err(RoomError::DuplicateParticipant(participant)),
            Entry::Vacant(vacant) => {
                let join_order = self.joins.fetch_add(1, Ordering::SeqCst);
                let subscription = self.channel.subscribe(participant);
                vacant.insert(ParticipantSession::new(
                    participant,
                    Role::Member,
                    join_order,
                    self.config.seats.standing,
                ));
                subscription
            }
        };
        // Claim the role only once the session is visible to promotion.
        let role = match self.tie_breaker.compare_exchange(
            NO_TIE_BREAKER,
            participant.0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                if let Some(mut session) = self.sessions.get_mut(&participant) {
                    session.role = Role::Authority;
                }
                Role::Authority
            }
            Err(_) => Role::Member,
        };
        tracing::info!(
            participant = %participant,
            ?role,
            replayed = subscription.replay.len(),
            "participant joined"
        );
        Ok(subscription)
    }

    /// Join and get an RPC handle bound to this room.
    pub fn join(
        self: &Arc<Self>,
        participant: ParticipantId,
    ) -> Result<(ParticipantHandle, Subscription), RoomError> {
        let subscription = self.participant_joined(participant)?;
        Ok((ParticipantHandle::new(Arc::clone(self), participant), subscription))
    }

    /// Join and build a participant-side interactor over the room's scene.
    pub fn interactor(
        self: &Arc<Self>,
        participant: ParticipantId,
    ) -> Result<Interactor<ParticipantHandle>, RoomError> {
        let (handle, subscription) = self.join(participant)?;
        Ok(Interactor::new(
            handle,
            subscription,
            self.scene.objects.iter().cloned(),
            self.config.interactor_tuning(),
        ))
    }

    pub(crate) fn publish(
        &self,
        object: ObjectId,
        kind: EventKind,
        payload: EventPayload,
        origin: ParticipantId,
    ) -> ReplicatedEvent {
        self.channel
            .publish(EventDraft::new(object, kind, payload, origin))
    }

    pub(crate) fn publish_seat(&self, change: SeatChange, origin: ParticipantId) {
        match change {
            SeatChange::Seated(seated) => self.publish(
                seated.group,
                EventKind::Sit,
                EventPayload::Seat {
                    index: seated.index,
                    occupant: Some(origin),
                    anchor: Some(seated.anchor),
                },
                origin,
            ),
            SeatChange::Vacated(vacated) => self.publish(
                vacated.group,
                EventKind::Stand,
                EventPayload::Seat {
                    index: vacated.index,
                    occupant: None,
                    anchor: None,
                },
                origin,
            ),
        };
    }

    /// Ask for exclusive control of `object`.
    pub fn request_grab(&self, participant: ParticipantId, object: ObjectId) -> Result<Grant, RoomError> {
        let Some(mut session) = self.sessions.get_mut(&participant) else {
            tracing::debug!(participant = %participant, object = %object, "grab from departed participant");
            return Err(OwnershipError::NotOwner {
                object,
                participant,
            }
            .into());
        };
        let tick = self.current_tick();
        let grant = OwnershipAuthority::new(&self.registry).request(object, participant, tick, |_, record| {
            self.publish(
                object,
                EventKind::Grab,
                EventPayload::Ownership {
                    owner: Some(participant),
                    tick: record.acquired_tick,
                    rest: None,
                },
                participant,
            );
        })?;
        session.owned.insert(object);
        Ok(grant)
    }

    /// Let go of `object` where it is.
    pub fn release_grab(&self, participant: ParticipantId, object: ObjectId) -> Result<(), RoomError> {
        let Some(mut session) = self.sessions.get_mut(&participant) else {
            return Err(OwnershipError::NotOwner {
                object,
                participant,
            }
            .into());
        };
        let tick = self.current_tick();
        OwnershipAuthority::new(&self.registry).release(object, participant, |obj, _| {
            self.publish(
                object,
                EventKind::Release,
                EventPayload::Ownership {
                    owner: None,
                    tick,
                    rest: Some(obj.transform),
                },
                participant,
            );
        })?;
        session.owned.remove(&object);
        Ok(())
    }

    /// Stream the live pose of a held object. Axis locks of the object are
    /// enforced on the pose before it is stored and sent.
    pub fn update_held_pose(
        &self,
        participant: ParticipantId,
        object: ObjectId,
        pose: Transform,
    ) -> Result<(), RoomError> {
        let not_owner = OwnershipError::NotOwner {
            object,
            participant,
        };
        let _session = self.sessions.get(&participant).ok_or(not_owner)?;
        self.registry
            .with_object_mut(object, |obj| {
                if !obj.is_owned_by(participant) {
                    return Err(RoomError::from(not_owner));
                }
                if !pose.is_finite() {
                    return Err(RoomError::InvalidPose(object));
                }
                let mut pose = pose;
                let locks = obj.physics.locks;
                if locks.position_y {
                    pose.position.y = obj.transform.position.y;
                }
                if locks.rotation_x || locks.rotation_z {
                    let (yaw, _, _) = pose.rotation.to_euler(EulerRot::YXZ);
                    pose.rotation = Quat::from_rotation_y(yaw);
                }
                obj.transform = pose;
                self.publish(object, EventKind::Move, EventPayload::Pose(pose), participant);
                Ok(())
            })
            .unwrap_or(Err(RoomError::MissingReference(object)))
    }

    /// Flip the toggle state of `object` through its capability handler.
    /// Returns the new state.
    pub fn toggle_interaction(&self, participant: ParticipantId, object: ObjectId) -> Result<bool, RoomError> {
        let _session = self
            .sessions
            .get(&participant)
            .ok_or(RoomError::UnknownParticipant(participant))?;
        let missing = RoomError::MissingCapability {
            object,
            capability: Capability::Toggleable,
        };
        self.registry
            .with_object_mut(object, |obj| {
                if !obj.category.is_interactable() {
                    return Err(missing);
                }
                let effect = self.handlers.toggle(obj, &self.config.doors).ok_or(missing)?;
                self.publish(
                    object,
                    EventKind::Toggle,
                    EventPayload::Toggle {
                        on: effect.on,
                        swing_to: effect.swing_to,
                    },
                    participant,
                );
                tracing::debug!(object = %object, participant = %participant, on = effect.on, "toggled");
                Ok(effect.on)
            })
            .unwrap_or_else(|| Err(RoomError::MissingReference(object)))
    }

    /// Set the yaw (degrees) or uniform scale of `object`. Denied while
    /// another participant holds it. Returns the value applied.
    pub fn set_transform_param(
        &self,
        participant: ParticipantId,
        object: ObjectId,
        param: TransformParam,
        value: f32,
    ) -> Result<f32, RoomError> {
        let _session = self
            .sessions
            .get(&participant)
            .ok_or(RoomError::UnknownParticipant(participant))?;
        let (capability, kind) = match param {
            TransformParam::Rotation => (Capability::Rotatable, EventKind::Rotate),
            TransformParam::Scale => (Capability::Scalable, EventKind::Scale),
        };
        if !value.is_finite() {
            return Err(RoomError::InvalidValue { param, value });
        }
        self.registry
            .with_object_mut(object, |obj| {
                if !obj.has(capability) {
                    return Err(RoomError::MissingCapability { object, capability });
                }
                if let Some(owner) = obj.owner_id()
                    && owner != participant
                {
                    return Err(OwnershipError::AlreadyOwned { object, owner }.into());
                }
                let (payload, applied) = match param {
                    TransformParam::Rotation => (EventPayload::Rotation { yaw_degrees: value }, value),
                    TransformParam::Scale => {
                        let factor = value.max(MIN_SCALE);
                        (EventPayload::Scale { factor }, factor)
                    }
                };
                let event = self.publish(object, kind, payload, participant);
                apply_to_object(obj, &event)?;
                Ok(applied)
            })
            .unwrap_or(Err(RoomError::MissingReference(object)))
    }

    /// Take the first free slot of a seat group. Returns the slot index.
    pub fn request_sit(&self, participant: ParticipantId, group: ObjectId) -> Result<usize, RoomError> {
        let Some(mut session) = self.sessions.get_mut(&participant) else {
            tracing::debug!(participant = %participant, group = %group, "sit from departed participant");
            return Err(SeatError::NoSeatAvailable(group).into());
        };
        match self.registry.read(group, |o| o.has(Capability::Sittable)) {
            None => return Err(SeatError::MissingReference(group).into()),
            Some(false) => {
                return Err(RoomError::MissingCapability {
                    object: group,
                    capability: Capability::Sittable,
                });
            }
            Some(true) => {}
        }
        let seated = self
            .seating
            .try_sit_with(group, participant, |change| self.publish_seat(change, participant))?;
        session.seat = Some((group, seated.index));
        session.envelope = self.config.seats.seated;
        Ok(seated.index)
    }

    /// Free the participant's seat. Always succeeds; returns the slot freed,
    /// if any.
    pub fn stand(&self, participant: ParticipantId, group: ObjectId) -> Result<Option<Vacated>, RoomError> {
        let Some(mut session) = self.sessions.get_mut(&participant) else {
            return Ok(None);
        };
        if let Some((seated_in, _)) = session.seat
            && seated_in != group
        {
            tracing::debug!(participant = %participant, requested = %group, seated_in = %seated_in, "standing from another group");
        }
        let vacated = self
            .seating
            .stand_with(participant, |v| self.publish_seat(SeatChange::Vacated(v), participant));
        session.seat = None;
        session.envelope = self.config.seats.standing;
        Ok(vacated)
    }

    /// Locomotion input. Stands a seated participant once either axis passes
    /// the movement threshold. Returns the group left.
    pub fn movement_input(&self, participant: ParticipantId, axis: Vec2) -> Result<Option<ObjectId>, RoomError> {
        let seat = self
            .sessions
            .get(&participant)
            .ok_or(RoomError::UnknownParticipant(participant))?
            .seat;
        let Some((group, _)) = seat else {
            return Ok(None);
        };
        if !self.config.seats.is_movement(axis) {
            return Ok(None);
        }
        tracing::debug!(participant = %participant, group = %group, "movement while seated, standing up");
        Ok(self.stand(participant, group)?.map(|v| v.group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use roomspace_common::Category;
    use roomspace_kernel::InteractableObject;
    use roomspace_schedule::DoorTuning;

    fn room() -> Room {
        Room::new(RoomConfig::default(), Scene::living_room(&DoorTuning::default()))
    }

    fn id(room: &Room, name: &str) -> ObjectId {
        room.scene().find(name).unwrap()
    }

    #[test]
    fn first_joiner_is_tie_breaker() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        room.participant_joined(ParticipantId(2)).unwrap();
        assert_eq!(room.tie_breaker(), Some(ParticipantId(1)));
        assert_eq!(room.session(ParticipantId(2)).unwrap().role, Role::Member);
        assert_eq!(room.participants(), vec![ParticipantId(1), ParticipantId(2)]);
        assert!(matches!(
            room.participant_joined(ParticipantId(1)),
            Err(RoomError::DuplicateParticipant(_))
        ));
    }

    #[test]
    fn concurrent_duplicate_join_admits_one() {
        for _ in 0..20 {
            let room = room();
            let barrier = std::sync::Barrier::new(2);
            let outcomes: Vec<bool> = std::thread::scope(|s| {
                let (room, barrier) = (&room, &barrier);
                let handles: Vec<_> = (0..2)
                    .map(|_| {
                        s.spawn(move || {
                            barrier.wait();
                            room.participant_joined(ParticipantId(7)).is_ok()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });
            assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
            assert_eq!(room.participants(), vec![ParticipantId(7)]);
            assert_eq!(room.channel().subscriber_count(), 1);
            assert_eq!(room.tie_breaker(), Some(ParticipantId(7)));
            assert_eq!(room.session(ParticipantId(7)).unwrap().role, Role::Authority);
        }
    }

    #[test]
    fn grab_publishes_and_tracks_session() {
        let room = room();
        let sub = room.participant_joined(ParticipantId(1)).unwrap();
        let lamp = id(&room, "lamp");
        let grant = room.request_grab(ParticipantId(1), lamp).unwrap();
        assert!(grant.fresh);
        assert!(room.session(ParticipantId(1)).unwrap().owned.contains(&lamp));
        assert!(room.registry().get(lamp).unwrap().physics.is_controlled());

        let event = sub.reliable.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Grab);

        // Re-requesting publishes nothing.
        room.request_grab(ParticipantId(1), lamp).unwrap();
        assert!(sub.reliable.try_recv().is_err());
    }

    #[test]
    fn release_carries_resting_pose() {
        let room = room();
        let sub = room.participant_joined(ParticipantId(1)).unwrap();
        let lamp = id(&room, "lamp");
        room.request_grab(ParticipantId(1), lamp).unwrap();
        let pose = Transform::from_position(Vec3::new(2.0, 1.0, 0.0));
        room.update_held_pose(ParticipantId(1), lamp, pose).unwrap();
        room.release_grab(ParticipantId(1), lamp).unwrap();

        let release = sub.reliable.try_iter().last().unwrap();
        assert_eq!(
            release.payload,
            EventPayload::Ownership {
                owner: None,
                tick: 0,
                rest: Some(pose),
            }
        );
        assert!(room.session(ParticipantId(1)).unwrap().owned.is_empty());
    }

    #[test]
    fn heavy_pose_keeps_height_and_yaw_only() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        let crate_ = id(&room, "crate");
        room.request_grab(ParticipantId(1), crate_).unwrap();
        let tilted = Transform {
            position: Vec3::new(1.0, 3.0, 1.0),
            rotation: Quat::from_rotation_x(0.5) * Quat::from_rotation_y(0.3),
            scale: Vec3::ONE,
        };
        room.update_held_pose(ParticipantId(1), crate_, tilted).unwrap();
        let stored = room.registry().get(crate_).unwrap().transform;
        assert_eq!(stored.position.y, 0.5);
        let up = stored.rotation * Vec3::Y;
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn pose_from_non_owner_is_denied() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        room.participant_joined(ParticipantId(2)).unwrap();
        let lamp = id(&room, "lamp");
        room.request_grab(ParticipantId(1), lamp).unwrap();
        let err = room
            .update_held_pose(ParticipantId(2), lamp, Transform::default())
            .unwrap_err();
        assert!(matches!(err, RoomError::Ownership(OwnershipError::NotOwner { .. })));
    }

    #[test]
    fn non_finite_pose_is_rejected() {
        let room = room();
        let sub = room.participant_joined(ParticipantId(1)).unwrap();
        let lamp = id(&room, "lamp");
        room.request_grab(ParticipantId(1), lamp).unwrap();
        let before = room.registry().read(lamp, |o| o.transform).unwrap();

        let bad = [
            Transform::from_position(Vec3::new(f32::NAN, 1.0, 0.0)),
            Transform::from_position(Vec3::new(0.0, f32::INFINITY, 0.0)),
            Transform {
                rotation: Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0),
                ..before
            },
        ];
        for pose in bad {
            assert!(matches!(
                room.update_held_pose(ParticipantId(1), lamp, pose),
                Err(RoomError::InvalidPose(object)) if object == lamp
            ));
        }
        assert_eq!(room.registry().read(lamp, |o| o.transform), Some(before));
        assert!(sub.unreliable.try_iter().next().is_none());

        room.release_grab(ParticipantId(1), lamp).unwrap();
        let release = sub.reliable.try_iter().last().unwrap();
        assert!(matches!(
            release.payload,
            EventPayload::Ownership { rest: Some(rest), .. } if rest == before
        ));
    }

    #[test]
    fn toggle_requires_capability() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        assert!(room.toggle_interaction(ParticipantId(1), id(&room, "television")).unwrap());
        assert!(!room.toggle_interaction(ParticipantId(1), id(&room, "television")).unwrap());
        assert!(matches!(
            room.toggle_interaction(ParticipantId(1), id(&room, "crate")),
            Err(RoomError::MissingCapability { .. })
        ));
        assert!(matches!(
            room.toggle_interaction(ParticipantId(1), ObjectId::new()),
            Err(RoomError::MissingReference(_))
        ));
    }

    #[test]
    fn door_toggle_snaps_rotation() {
        let room = room();
        let sub = room.participant_joined(ParticipantId(1)).unwrap();
        let door = id(&room, "door");
        room.toggle_interaction(ParticipantId(1), door).unwrap();
        let event = sub.reliable.try_recv().unwrap();
        let EventPayload::Toggle {
            on: true,
            swing_to: Some(target),
        } = event.payload
        else {
            panic!("expected door toggle, got {:?}", event.payload);
        };
        assert_eq!(room.registry().get(door).unwrap().transform.rotation, target);
    }

    #[test]
    fn transform_params() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        room.participant_joined(ParticipantId(2)).unwrap();
        let lamp = id(&room, "lamp");

        assert_eq!(
            room.set_transform_param(ParticipantId(1), lamp, TransformParam::Scale, -3.0).unwrap(),
            MIN_SCALE
        );
        room.set_transform_param(ParticipantId(1), lamp, TransformParam::Rotation, 90.0)
            .unwrap();
        let rotation = room.registry().get(lamp).unwrap().transform.rotation;
        assert!(((rotation * Vec3::Z) - Vec3::X).length() < 1e-5);

        room.request_grab(ParticipantId(1), lamp).unwrap();
        assert!(room
            .set_transform_param(ParticipantId(1), lamp, TransformParam::Scale, 2.0)
            .is_ok());
        let denied = room
            .set_transform_param(ParticipantId(2), lamp, TransformParam::Scale, 2.0)
            .unwrap_err();
        assert!(denied.is_contention());

        assert!(matches!(
            room.set_transform_param(ParticipantId(1), id(&room, "door"), TransformParam::Rotation, 10.0),
            Err(RoomError::MissingCapability { .. })
        ));
        assert!(matches!(
            room.set_transform_param(ParticipantId(1), lamp, TransformParam::Rotation, f32::NAN),
            Err(RoomError::InvalidValue { .. })
        ));
    }

    #[test]
    fn sit_switches_envelope_and_movement_stands() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        let sofa = id(&room, "sofa");
        assert_eq!(room.request_sit(ParticipantId(1), sofa).unwrap(), 0);
        let session = room.session(ParticipantId(1)).unwrap();
        assert_eq!(session.envelope, room.config().seats.seated);

        assert_eq!(room.movement_input(ParticipantId(1), Vec2::new(0.05, 0.0)).unwrap(), None);
        assert_eq!(room.movement_input(ParticipantId(1), Vec2::new(0.0, 0.5)).unwrap(), Some(sofa));
        let session = room.session(ParticipantId(1)).unwrap();
        assert_eq!(session.seat, None);
        assert_eq!(session.envelope, room.config().seats.standing);
        assert_eq!(room.seating().group(sofa).unwrap().occupancy(), 0);
    }

    #[test]
    fn sit_on_non_sittable_is_denied() {
        let room = room();
        room.participant_joined(ParticipantId(1)).unwrap();
        assert!(matches!(
            room.request_sit(ParticipantId(1), id(&room, "lamp")),
            Err(RoomError::MissingCapability { .. })
        ));
        assert!(matches!(
            room.request_sit(ParticipantId(1), ObjectId::new()),
            Err(RoomError::Seat(SeatError::MissingReference(_)))
        ));
    }

    #[test]
    fn requests_from_strangers_are_denied() {
        let room = room();
        let lamp = id(&room, "lamp");
        let sofa = id(&room, "sofa");
        assert!(matches!(
            room.request_grab(ParticipantId(9), lamp),
            Err(RoomError::Ownership(OwnershipError::NotOwner { .. }))
        ));
        assert!(matches!(
            room.request_sit(ParticipantId(9), sofa),
            Err(RoomError::Seat(SeatError::NoSeatAvailable(_)))
        ));
        assert!(matches!(room.stand(ParticipantId(9), sofa), Ok(None)));
    }

    #[test]
    fn static_catalog_object_cannot_be_grabbed() {
        let wall = InteractableObject::new("wall", Category::Static);
        let wall_id = wall.id;
        let room = Room::new(RoomConfig::default(), Scene::new().with_object(wall));
        room.participant_joined(ParticipantId(1)).unwrap();
        assert!(matches!(
            room.request_grab(ParticipantId(1), wall_id),
            Err(RoomError::Ownership(OwnershipError::NotGrabbable(_)))
        ));
    }

    #[test]
    fn ticks_advance() {
        let room = room();
        assert_eq!(room.current_tick(), 0);
        assert_eq!(room.advance_tick(), 1);
        assert_eq!(room.current_tick(), 1);
    }
}
