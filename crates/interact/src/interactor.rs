use std::collections::BTreeMap;

use glam::{EulerRot, Quat, Vec2, Vec3};
use roomspace_common::{ObjectId, ParticipantId, Transform};
use roomspace_grab::{GrabSession, GrabTuning};
use roomspace_input::{Action, MenuAction, Ray, RayRange, Slider, SliderKind};
use roomspace_kernel::InteractableObject;
use roomspace_replicate::{EventPayload, Replica, ReplicatedEvent, Subscription};
use roomspace_schedule::{DoorTuning, ScheduleStats, Scheduler};
use serde::{Deserialize, Serialize};

use crate::backend::InteractionBackend;
use crate::machine::{InteractionMachine, InteractionState, MachineEvent};
use crate::menu::{InteractionSignal, InteractionTuning, menu_for};

/// Tuning sections the participant side needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractorTuning {
    pub interaction: InteractionTuning,
    pub grab: GrabTuning,
    pub door: DoorTuning,
}

#[derive(Debug)]
struct Held {
    session: GrabSession,
    pose: Transform,
}

/// One participant's interaction loop.
///
/// Owns a [`Replica`] of the room, one [`InteractionMachine`] per touched
/// object, the local grab session and the door swing scheduler. Requests go
/// to the room through `B`; the outcome of other participants' actions
/// arrives through the subscription on [`tick`](Interactor::tick).
#[derive(Debug)]
pub struct Interactor<B: InteractionBackend> {
    backend: B,
    subscription: Subscription,
    replica: Replica,
    machines: BTreeMap<ObjectId, InteractionMachine>,
    highlighted: Option<ObjectId>,
    held: Option<Held>,
    seat: Option<(ObjectId, usize)>,
    sliders: BTreeMap<ObjectId, Slider>,
    scheduler: Scheduler,
    swing_poses: BTreeMap<ObjectId, Quat>,
    ray_range: RayRange,
    view_origin: Vec3,
    view_forward: Vec3,
    tuning: InteractorTuning,
}

impl<B: InteractionBackend> Interactor<B> {
    /// Build the replica from `catalog` and bring it up to date with the
    /// subscription's join replay.
    pub fn new(
        backend: B,
        subscription: Subscription,
        catalog: impl IntoIterator<Item = InteractableObject>,
        tuning: InteractorTuning,
    ) -> Self {
        let mut replica = Replica::new(backend.participant(), catalog);
        let replayed = replica.apply_replay(&subscription.replay);
        tracing::debug!(participant = %backend.participant(), replayed = replayed.len(), "replica ready");
        Self {
            backend,
            subscription,
            replica,
            machines: BTreeMap::new(),
            highlighted: None,
            held: None,
            seat: None,
            sliders: BTreeMap::new(),
            scheduler: Scheduler::new(),
            swing_poses: BTreeMap::new(),
            ray_range: tuning.interaction.ray_range,
            view_origin: Vec3::ZERO,
            view_forward: Vec3::NEG_Z,
            tuning,
        }
    }

    /// Participant this interactor acts for.
    pub fn participant(&self) -> ParticipantId {
        self.backend.participant()
    }

    /// The request backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Local copy of the room state.
    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    /// Interaction state of `object`; untouched objects are idle.
    pub fn state(&self, object: ObjectId) -> InteractionState {
        self.machines
            .get(&object)
            .map_or(InteractionState::Idle, InteractionMachine::state)
    }

    /// Object under the pointer after the last `Point`.
    pub fn highlighted(&self) -> Option<ObjectId> {
        self.highlighted
    }

    /// Object currently held, if any.
    pub fn held_object(&self) -> Option<ObjectId> {
        self.held.as_ref().map(|h| h.session.object())
    }

    /// Seat group and slot currently occupied.
    pub fn seat(&self) -> Option<(ObjectId, usize)> {
        self.seat
    }

    /// Open slider of `object`.
    pub fn slider(&self, object: ObjectId) -> Option<Slider> {
        self.sliders.get(&object).copied()
    }

    /// Number of door swings still animating.
    pub fn swings_in_progress(&self) -> usize {
        self.scheduler.active()
    }

    /// Counters of the door swing scheduler.
    pub fn schedule_stats(&self) -> ScheduleStats {
        self.scheduler.stats()
    }

    /// Current pointing range preset.
    pub fn ray_range(&self) -> RayRange {
        self.ray_range
    }

    /// Switch to the next pointing range preset and return it.
    pub fn cycle_ray_range(&mut self) -> RayRange {
        self.ray_range = self.ray_range.next();
        tracing::debug!(participant = %self.participant(), range = ?self.ray_range, "ray range changed");
        self.ray_range
    }

    /// A pointing ray reaching as far as the current range preset.
    pub fn pointer(&self, origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction, self.ray_range.meters())
    }

    /// Transform to present for `object`: the replicated state, with any
    /// door swing still in progress applied.
    pub fn presented_transform(&self, object: ObjectId) -> Option<Transform> {
        let transform = self.replica.registry().read(object, |o| o.transform)?;
        Some(match self.swing_poses.get(&object) {
            Some(rotation) => Transform {
                rotation: *rotation,
                ..transform
            },
            None => transform,
        })
    }

    /// Apply one input action.
    pub fn handle(&mut self, action: Action) -> Vec<InteractionSignal> {
        let mut signals = Vec::new();
        match action {
            Action::Point(ray) => self.point(ray, &mut signals),
            Action::Activate => self.activate(&mut signals),
            Action::Choose { object, action } => self.choose(object, action, &mut signals),
            Action::Adjust {
                object,
                kind,
                axis,
                dt,
            } => self.adjust(object, kind, axis, dt, &mut signals),
            Action::Release => self.release(&mut signals),
            Action::Move(axis) => self.movement(axis, &mut signals),
            Action::Exit(object) => self.exit(object, &mut signals),
        }
        signals
    }

    /// Advance one frame: stream the held pose, apply replicated events and
    /// advance door swings.
    pub fn tick(&mut self, dt: f32) -> Vec<InteractionSignal> {
        let mut signals = Vec::new();

        if let Some(held) = self.held.as_mut() {
            let object = held.session.object();
            let pose = held
                .session
                .step(held.pose, self.view_origin, self.view_forward, dt);
            match self.backend.update_held_pose(object, pose) {
                Ok(()) => held.pose = pose,
                Err(err) => tracing::debug!(object = %object, error = %err, "held pose rejected"),
            }
        }

        for event in self.replica.drain(&self.subscription) {
            self.observe(&event, &mut signals);
        }

        for frame in self.scheduler.tick(dt) {
            if frame.finished {
                self.swing_poses.remove(&frame.object);
            } else {
                self.swing_poses.insert(frame.object, frame.rotation);
            }
        }
        signals
    }

    fn transition(
        &mut self,
        object: ObjectId,
        event: MachineEvent,
        signals: &mut Vec<InteractionSignal>,
    ) -> bool {
        let machine = self
            .machines
            .entry(object)
            .or_insert_with(|| InteractionMachine::new(object));
        let from = machine.state();
        match machine.apply(event) {
            Ok(to) => {
                if to != from {
                    signals.push(InteractionSignal::StateChanged { object, from, to });
                }
                true
            }
            Err(err) => {
                tracing::debug!(object = %object, error = %err, "transition ignored");
                false
            }
        }
    }

    fn unavailable(
        object: ObjectId,
        action: MenuAction,
        reason: impl ToString,
        signals: &mut Vec<InteractionSignal>,
    ) {
        let reason = reason.to_string();
        tracing::debug!(object = %object, %action, %reason, "interaction unavailable");
        signals.push(InteractionSignal::Unavailable {
            object,
            action,
            reason,
        });
    }

    fn point(&mut self, ray: Ray, signals: &mut Vec<InteractionSignal>) {
        let ray = Ray {
            range: ray.range.min(self.ray_range.meters()),
            ..ray
        };
        self.view_origin = ray.origin;
        if ray.direction != Vec3::ZERO {
            self.view_forward = ray.direction;
        }

        let hit = self
            .replica
            .registry()
            .snapshot()
            .into_iter()
            .filter(|o| o.category.is_interactable())
            .filter_map(|o| {
                let transform = self.presented_transform(o.id).unwrap_or(o.transform);
                ray.hit(&transform, o.half_extents).map(|d| (o.id, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        if let Some(previous) = self.highlighted
            && Some(previous) != hit
            && self.state(previous) == InteractionState::Highlighted
        {
            self.transition(previous, MachineEvent::PointedAway, signals);
        }
        if let Some(object) = hit
            && self.state(object) == InteractionState::Idle
        {
            self.transition(object, MachineEvent::PointedAt, signals);
        }
        self.highlighted = hit;
    }

    fn activate(&mut self, signals: &mut Vec<InteractionSignal>) {
        let Some(object) = self.highlighted else {
            return;
        };
        match self.state(object) {
            InteractionState::Highlighted => {
                let Some(actions) = self.replica.registry().read(object, menu_for) else {
                    return;
                };
                if self.transition(object, MachineEvent::Activate, signals) {
                    signals.push(InteractionSignal::MenuOpened { object, actions });
                }
            }
            InteractionState::MenuOpen => {
                self.sliders.remove(&object);
                self.transition(object, MachineEvent::Activate, signals);
            }
            _ => {}
        }
    }

    fn choose(&mut self, object: ObjectId, action: MenuAction, signals: &mut Vec<InteractionSignal>) {
        let state = self.state(object);
        let allowed = match action {
            MenuAction::Exit => state != InteractionState::Idle,
            MenuAction::Toggle => {
                matches!(state, InteractionState::MenuOpen | InteractionState::Toggled)
            }
            _ => state == InteractionState::MenuOpen,
        };
        if !allowed {
            tracing::debug!(object = %object, %action, %state, "menu action outside open menu");
            return;
        }
        let offered = self
            .replica
            .registry()
            .read(object, |o| menu_for(o).contains(&action))
            .unwrap_or(false);
        if !offered {
            Self::unavailable(object, action, format!("object does not support {action}"), signals);
            return;
        }

        match action {
            MenuAction::Grab => self.grab(object, signals),
            MenuAction::Toggle => match self.backend.toggle(object) {
                Ok(_) => {
                    self.transition(object, MachineEvent::Toggled, signals);
                }
                Err(err) => Self::unavailable(object, action, err, signals),
            },
            MenuAction::Sit => match self.backend.request_sit(object) {
                Ok(index) => {
                    self.seat = Some((object, index));
                    self.transition(object, MachineEvent::Seated, signals);
                }
                Err(err) => Self::unavailable(object, action, err, signals),
            },
            MenuAction::Rotate | MenuAction::Scale => {
                let Some(kind) = action.slider() else {
                    return;
                };
                let Some(transform) = self.replica.registry().read(object, |o| o.transform) else {
                    return;
                };
                let value = slider_value(&transform, kind);
                self.sliders.insert(object, Slider::new(kind, value));
                signals.push(InteractionSignal::SliderChanged {
                    object,
                    kind,
                    value,
                });
            }
            MenuAction::Exit => self.exit(object, signals),
        }
    }

    fn grab(&mut self, object: ObjectId, signals: &mut Vec<InteractionSignal>) {
        if self.held.is_some() {
            self.release(signals);
        }
        if let Err(err) = self.backend.request_grab(object) {
            Self::unavailable(object, MenuAction::Grab, err, signals);
            return;
        }
        let origin = self.view_origin;
        let tuning = &self.tuning.grab;
        let started = self.replica.registry().with_object_mut(object, |obj| {
            let session = GrabSession::begin(obj, origin, tuning);
            (session, obj.transform)
        });
        match started {
            Some((session, pose)) => {
                self.held = Some(Held { session, pose });
                self.sliders.remove(&object);
                self.transition(object, MachineEvent::Granted, signals);
            }
            None => {
                tracing::warn!(object = %object, "granted object missing from replica");
                if let Err(err) = self.backend.release_grab(object) {
                    tracing::debug!(object = %object, error = %err, "release after failed grab");
                }
            }
        }
    }

    fn release(&mut self, signals: &mut Vec<InteractionSignal>) {
        let Some(held) = self.held.take() else {
            return;
        };
        let object = held.session.object();
        if let Err(err) = self.backend.release_grab(object) {
            tracing::debug!(object = %object, error = %err, "release not accepted");
        }
        self.replica
            .registry()
            .with_object_mut(object, |obj| held.session.end(obj));
        self.transition(object, MachineEvent::Exit, signals);
    }

    fn exit(&mut self, object: ObjectId, signals: &mut Vec<InteractionSignal>) {
        match self.state(object) {
            InteractionState::Held if self.held_object() == Some(object) => self.release(signals),
            InteractionState::Occupied => {
                if let Err(err) = self.backend.stand(object) {
                    tracing::debug!(object = %object, error = %err, "stand not accepted");
                }
                self.seat = None;
                self.transition(object, MachineEvent::Exit, signals);
            }
            InteractionState::Idle | InteractionState::Highlighted => {}
            _ => {
                self.sliders.remove(&object);
                self.transition(object, MachineEvent::Exit, signals);
            }
        }
    }

    fn adjust(
        &mut self,
        object: ObjectId,
        kind: SliderKind,
        axis: f32,
        dt: f32,
        signals: &mut Vec<InteractionSignal>,
    ) {
        let Some(slider) = self.sliders.get_mut(&object).filter(|s| s.kind == kind) else {
            return;
        };
        let previous = slider.value;
        let Some(value) = slider.step(axis, dt, &self.tuning.interaction.slider) else {
            return;
        };
        match self.backend.set_transform_param(object, kind, value) {
            Ok(()) => signals.push(InteractionSignal::SliderChanged {
                object,
                kind,
                value,
            }),
            Err(err) => {
                slider.sync(previous);
                Self::unavailable(object, MenuAction::from(kind), err, signals);
            }
        }
    }

    fn movement(&mut self, axis: Vec2, signals: &mut Vec<InteractionSignal>) {
        match self.backend.movement_input(axis) {
            Ok(Some(group)) => {
                self.seat = None;
                self.transition(group, MachineEvent::Exit, signals);
            }
            Ok(None) => {}
            Err(err) => tracing::debug!(error = %err, "movement input rejected"),
        }
    }

    /// React to a replicated event that was just applied to the replica.
    ///
    /// Ownership and seat changes this participant caused were already
    /// handled when the request returned; their echo may arrive after a
    /// newer grab or sit and must not undo it.
    fn observe(&mut self, event: &ReplicatedEvent, signals: &mut Vec<InteractionSignal>) {
        let object = event.object;
        let me = self.participant();
        let echo = event.origin == me;
        match event.payload {
            EventPayload::Ownership { owner, .. } => {
                if !echo && self.held_object() == Some(object) && owner != Some(me) {
                    // The replica already reflects the new physics state.
                    self.held = None;
                    self.transition(object, MachineEvent::OwnershipLost, signals);
                }
            }
            EventPayload::Toggle {
                on,
                swing_to: Some(to),
            } => {
                let from = self
                    .replica
                    .registry()
                    .read(object, |o| o.hinge.map(|h| h.target(!on)))
                    .flatten()
                    .unwrap_or(to);
                let task = self
                    .scheduler
                    .schedule_swing(object, from, to, self.tuning.door.speed);
                if let Some(swing) = self.scheduler.get(task) {
                    self.swing_poses.insert(object, swing.current());
                }
            }
            EventPayload::Rotation { yaw_degrees } => self.sync_slider(object, SliderKind::Rotation, yaw_degrees),
            EventPayload::Scale { factor } => self.sync_slider(object, SliderKind::Scale, factor),
            EventPayload::Seat {
                index, occupant, ..
            } => {
                if !echo && self.seat == Some((object, index)) && occupant != Some(me) {
                    self.seat = None;
                    self.transition(object, MachineEvent::SeatLost, signals);
                }
            }
            EventPayload::Toggle { swing_to: None, .. } | EventPayload::Pose(_) => {}
        }
    }

    fn sync_slider(&mut self, object: ObjectId, kind: SliderKind, value: f32) {
        if let Some(slider) = self.sliders.get_mut(&object).filter(|s| s.kind == kind) {
            slider.sync(value);
        }
    }
}

/// Current value a slider of `kind` starts from.
fn slider_value(transform: &Transform, kind: SliderKind) -> f32 {
    match kind {
        SliderKind::Rotation => {
            let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
            yaw.to_degrees().rem_euclid(360.0)
        }
        SliderKind::Scale => transform.scale.x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomspace_common::{Capability, Category};
    use roomspace_replicate::{EventDraft, EventKind, ReplicationChannel};
    use std::cell::RefCell;

    /// Backend that answers from canned decisions and records calls.
    struct ScriptedBackend {
        me: ParticipantId,
        grant: bool,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(grant: bool) -> Self {
            Self {
                me: ParticipantId(1),
                grant,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn answer<T>(&self, call: &str, value: T) -> Result<T, String> {
            self.calls.borrow_mut().push(call.to_string());
            if self.grant {
                Ok(value)
            } else {
                Err(format!("{call} denied"))
            }
        }
    }

    impl InteractionBackend for ScriptedBackend {
        type Error = String;

        fn participant(&self) -> ParticipantId {
            self.me
        }
        fn request_grab(&self, _: ObjectId) -> Result<(), String> {
            self.answer("grab", ())
        }
        fn release_grab(&self, _: ObjectId) -> Result<(), String> {
            self.answer("release", ())
        }
        fn update_held_pose(&self, _: ObjectId, _: Transform) -> Result<(), String> {
            self.answer("pose", ())
        }
        fn toggle(&self, _: ObjectId) -> Result<bool, String> {
            self.answer("toggle", true)
        }
        fn set_transform_param(&self, _: ObjectId, _: SliderKind, _: f32) -> Result<(), String> {
            self.answer("param", ())
        }
        fn request_sit(&self, _: ObjectId) -> Result<usize, String> {
            self.answer("sit", 0)
        }
        fn stand(&self, _: ObjectId) -> Result<(), String> {
            self.answer("stand", ())
        }
        fn movement_input(&self, _: Vec2) -> Result<Option<ObjectId>, String> {
            Ok(None)
        }
    }

    struct Fixture {
        channel: ReplicationChannel,
        cup: InteractableObject,
        door: InteractableObject,
        wall: InteractableObject,
    }

    fn fixture() -> Fixture {
        let cup = InteractableObject::new("cup", Category::Light)
            .at(Transform::from_position(Vec3::new(0.0, 0.0, -3.0)));
        let door = InteractableObject::new("door", Category::InteractOnly)
            .with_capability(Capability::Door)
            .at(Transform::from_position(Vec3::new(5.0, 0.0, 0.0)))
            .with_hinge(90.0);
        let wall = InteractableObject::new("wall", Category::Static)
            .at(Transform::from_position(Vec3::new(0.0, 0.0, 3.0)));
        Fixture {
            channel: ReplicationChannel::default(),
            cup,
            door,
            wall,
        }
    }

    fn interactor(f: &Fixture, grant: bool) -> Interactor<ScriptedBackend> {
        let sub = f.channel.subscribe(ParticipantId(1));
        Interactor::new(
            ScriptedBackend::new(grant),
            sub,
            [f.cup.clone(), f.door.clone(), f.wall.clone()],
            InteractorTuning::default(),
        )
    }

    fn open_menu(i: &mut Interactor<ScriptedBackend>, direction: Vec3) {
        let ray = i.pointer(Vec3::ZERO, direction);
        i.handle(Action::Point(ray));
        i.handle(Action::Activate);
    }

    #[test]
    fn pointing_highlights_and_moves_on() {
        let f = fixture();
        let mut i = interactor(&f, true);
        let signals = i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::NEG_Z)));
        assert_eq!(i.state(f.cup.id), InteractionState::Highlighted);
        assert_eq!(signals.len(), 1);

        i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::X)));
        assert_eq!(i.state(f.cup.id), InteractionState::Idle);
        assert_eq!(i.state(f.door.id), InteractionState::Highlighted);
    }

    #[test]
    fn static_objects_never_highlight() {
        let f = fixture();
        let mut i = interactor(&f, true);
        i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::Z)));
        assert_eq!(i.state(f.wall.id), InteractionState::Idle);
        assert_eq!(i.highlighted(), None);
    }

    #[test]
    fn activate_opens_capability_menu_and_closes_again() {
        let f = fixture();
        let mut i = interactor(&f, true);
        i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::X)));
        let signals = i.handle(Action::Activate);
        assert!(signals.contains(&InteractionSignal::MenuOpened {
            object: f.door.id,
            actions: vec![MenuAction::Toggle, MenuAction::Exit],
        }));
        i.handle(Action::Activate);
        assert_eq!(i.state(f.door.id), InteractionState::Idle);
    }

    #[test]
    fn granted_grab_holds_and_streams() {
        let f = fixture();
        let mut i = interactor(&f, true);
        open_menu(&mut i, Vec3::NEG_Z);
        i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Grab,
        });
        assert_eq!(i.state(f.cup.id), InteractionState::Held);
        assert_eq!(i.held_object(), Some(f.cup.id));

        i.tick(0.016);
        assert!(i.backend().calls.borrow().contains(&"pose".to_string()));

        i.handle(Action::Release);
        assert_eq!(i.state(f.cup.id), InteractionState::Idle);
        assert_eq!(i.held_object(), None);
    }

    #[test]
    fn denied_grab_stays_in_menu() {
        let f = fixture();
        let mut i = interactor(&f, false);
        open_menu(&mut i, Vec3::NEG_Z);
        let signals = i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Grab,
        });
        assert_eq!(i.state(f.cup.id), InteractionState::MenuOpen);
        assert!(matches!(
            signals.as_slice(),
            [InteractionSignal::Unavailable { action: MenuAction::Grab, .. }]
        ));
        assert_eq!(i.backend().calls.borrow().len(), 1);
    }

    #[test]
    fn unsupported_action_is_unavailable_locally() {
        let f = fixture();
        let mut i = interactor(&f, true);
        open_menu(&mut i, Vec3::X);
        let signals = i.handle(Action::Choose {
            object: f.door.id,
            action: MenuAction::Grab,
        });
        assert!(matches!(signals.as_slice(), [InteractionSignal::Unavailable { .. }]));
        assert!(i.backend().calls.borrow().is_empty());
    }

    #[test]
    fn ownership_loss_returns_to_idle() {
        let f = fixture();
        let mut i = interactor(&f, true);
        open_menu(&mut i, Vec3::NEG_Z);
        i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Grab,
        });

        // The room takes the cup away on someone else's behalf.
        f.channel.publish(EventDraft::new(
            f.cup.id,
            EventKind::Grab,
            EventPayload::Ownership {
                owner: Some(ParticipantId(1)),
                tick: 1,
                rest: None,
            },
            ParticipantId(1),
        ));
        f.channel.publish(EventDraft::new(
            f.cup.id,
            EventKind::Release,
            EventPayload::Ownership {
                owner: None,
                tick: 2,
                rest: None,
            },
            ParticipantId(2),
        ));
        let signals = i.tick(0.016);
        assert_eq!(i.state(f.cup.id), InteractionState::Idle);
        assert!(signals.contains(&InteractionSignal::StateChanged {
            object: f.cup.id,
            from: InteractionState::Held,
            to: InteractionState::Idle,
        }));
    }

    #[test]
    fn own_release_echo_keeps_new_grab() {
        let f = fixture();
        let mut i = interactor(&f, true);
        let ownership = |owner: Option<ParticipantId>, kind, tick| {
            EventDraft::new(
                f.cup.id,
                kind,
                EventPayload::Ownership {
                    owner,
                    tick,
                    rest: None,
                },
                ParticipantId(1),
            )
        };
        open_menu(&mut i, Vec3::NEG_Z);
        i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Grab,
        });
        i.handle(Action::Release);
        open_menu(&mut i, Vec3::NEG_Z);
        i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Grab,
        });

        // Grab, release and grab again all arrive in one frame.
        f.channel.publish(ownership(Some(ParticipantId(1)), EventKind::Grab, 1));
        f.channel.publish(ownership(None, EventKind::Release, 1));
        f.channel.publish(ownership(Some(ParticipantId(1)), EventKind::Grab, 1));
        let signals = i.tick(0.016);
        assert_eq!(i.held_object(), Some(f.cup.id));
        assert_eq!(i.state(f.cup.id), InteractionState::Held);
        assert!(signals.is_empty());
    }

    #[test]
    fn ray_range_bounds_picking_and_cycles() {
        let f = fixture();
        let mut i = interactor(&f, true);
        assert_eq!(i.ray_range(), RayRange::Medium);
        assert_eq!(i.cycle_ray_range(), RayRange::Long);
        assert_eq!(i.cycle_ray_range(), RayRange::Short);

        // The cup is 2.5m away: out of reach at 1m, even for a longer ray.
        i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::NEG_Z)));
        assert_eq!(i.highlighted(), None);
        i.handle(Action::Point(Ray::new(Vec3::ZERO, Vec3::NEG_Z, 50.0)));
        assert_eq!(i.highlighted(), None);
        assert_eq!(i.state(f.cup.id), InteractionState::Idle);

        assert_eq!(i.cycle_ray_range(), RayRange::Medium);
        i.handle(Action::Point(i.pointer(Vec3::ZERO, Vec3::NEG_Z)));
        assert_eq!(i.highlighted(), Some(f.cup.id));
    }

    #[test]
    fn configured_ray_range_is_the_starting_preset() {
        let f = fixture();
        let sub = f.channel.subscribe(ParticipantId(1));
        let mut tuning = InteractorTuning::default();
        tuning.interaction.ray_range = RayRange::Short;
        let i = Interactor::new(ScriptedBackend::new(true), sub, [f.cup.clone()], tuning);
        assert_eq!(i.ray_range(), RayRange::Short);
        assert_eq!(i.pointer(Vec3::ZERO, Vec3::X).range, 1.0);
    }

    #[test]
    fn door_toggle_animates_towards_target() {
        let f = fixture();
        let mut i = interactor(&f, true);
        let open = f.door.hinge.unwrap().target(true);
        f.channel.publish(EventDraft::new(
            f.door.id,
            EventKind::Toggle,
            EventPayload::Toggle {
                on: true,
                swing_to: Some(open),
            },
            ParticipantId(2),
        ));
        i.tick(0.25);
        assert_eq!(i.swings_in_progress(), 1);
        let mid = i.presented_transform(f.door.id).unwrap().rotation;
        assert!((mid.angle_between(Quat::IDENTITY).to_degrees() - 45.0).abs() < 1.0);

        i.tick(0.5);
        assert_eq!(i.swings_in_progress(), 0);
        assert_eq!(i.presented_transform(f.door.id).unwrap().rotation, open);
        let stats = i.schedule_stats();
        assert_eq!(stats.finished_this_tick, 1);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn slider_starts_from_replica_and_pushes_values() {
        let f = fixture();
        let mut i = interactor(&f, true);
        open_menu(&mut i, Vec3::NEG_Z);
        i.handle(Action::Choose {
            object: f.cup.id,
            action: MenuAction::Scale,
        });
        assert_eq!(i.slider(f.cup.id).unwrap().value, 1.0);
        let signals = i.handle(Action::Adjust {
            object: f.cup.id,
            kind: SliderKind::Scale,
            axis: 1.0,
            dt: 0.04,
        });
        assert!(matches!(
            signals.as_slice(),
            [InteractionSignal::SliderChanged { kind: SliderKind::Scale, .. }]
        ));
        assert!((i.slider(f.cup.id).unwrap().value - 2.0).abs() < 1e-4);
    }

    #[test]
    fn seat_exit_stands() {
        let f = fixture();
        let bench = InteractableObject::new("bench", Category::InteractOnly)
            .with_capability(Capability::Sittable)
            .at(Transform::from_position(Vec3::new(-4.0, 0.0, 0.0)));
        let sub = f.channel.subscribe(ParticipantId(1));
        let mut i = Interactor::new(
            ScriptedBackend::new(true),
            sub,
            [bench.clone()],
            InteractorTuning::default(),
        );
        open_menu(&mut i, Vec3::NEG_X);
        i.handle(Action::Choose {
            object: bench.id,
            action: MenuAction::Sit,
        });
        assert_eq!(i.state(bench.id), InteractionState::Occupied);
        assert_eq!(i.seat(), Some((bench.id, 0)));

        i.handle(Action::Exit(bench.id));
        assert_eq!(i.state(bench.id), InteractionState::Idle);
        assert!(i.backend().calls.borrow().contains(&"stand".to_string()));
    }
}
