use std::collections::BTreeMap;

use glam::Quat;
use roomspace_common::Capability;
use roomspace_kernel::{DoorHinge, InteractableObject};
use roomspace_schedule::DoorTuning;

/// Result of an authoritative toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleEffect {
    pub on: bool,
    /// Rotation a door snaps to.
    pub swing_to: Option<Quat>,
}

pub type ToggleHandler = fn(&mut InteractableObject, &DoorTuning) -> ToggleEffect;

/// Capability-selected toggle behaviour.
///
/// Looked up in capability order, so an object that is both a door and
/// toggleable swings like a door.
#[derive(Debug, Clone)]
pub struct HandlerTable {
    toggles: BTreeMap<Capability, ToggleHandler>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        let mut table = Self {
            toggles: BTreeMap::new(),
        };
        table.register(Capability::Door, swing_door);
        table.register(Capability::Toggleable, flip);
        table
    }
}

impl HandlerTable {
    /// Route toggles of objects with `capability` to `handler`, replacing any earlier one.
    pub fn register(&mut self, capability: Capability, handler: ToggleHandler) {
        self.toggles.insert(capability, handler);
    }

    /// Handler for the first toggle-capable capability the object has.
    pub fn toggle_handler(&self, obj: &InteractableObject) -> Option<ToggleHandler> {
        const PRECEDENCE: [Capability; 2] = [Capability::Door, Capability::Toggleable];
        let caps = obj.capabilities();
        PRECEDENCE
            .iter()
            .filter(|c| caps.contains(**c))
            .find_map(|c| self.toggles.get(c).copied())
            .or_else(|| {
                self.toggles
                    .iter()
                    .find(|(c, _)| caps.contains(**c))
                    .map(|(_, h)| *h)
            })
    }

    /// Run the object's toggle handler. `None` if it has none.
    pub fn toggle(&self, obj: &mut InteractableObject, door: &DoorTuning) -> Option<ToggleEffect> {
        self.toggle_handler(obj).map(|handler| handler(obj, door))
    }
}

fn flip(obj: &mut InteractableObject, _door: &DoorTuning) -> ToggleEffect {
    obj.toggled = !obj.toggled;
    ToggleEffect {
        on: obj.toggled,
        swing_to: None,
    }
}

fn swing_door(obj: &mut InteractableObject, door: &DoorTuning) -> ToggleEffect {
    let closed = obj.transform.rotation;
    let hinge = *obj
        .hinge
        .get_or_insert_with(|| DoorHinge::new(closed, door.open_angle_degrees));
    obj.toggled = !obj.toggled;
    let target = hinge.target(obj.toggled);
    obj.transform.rotation = target;
    ToggleEffect {
        on: obj.toggled,
        swing_to: Some(target),
    }
}
