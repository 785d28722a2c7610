use roomspace_common::{Capability, ObjectId};
use roomspace_input::{MenuAction, RayRange, SliderKind, SliderTuning};
use roomspace_kernel::InteractableObject;
use serde::{Deserialize, Serialize};

use crate::machine::InteractionState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTuning {
    /// Pointing range preset a new interactor starts with.
    pub ray_range: RayRange,
    pub slider: SliderTuning,
}

/// Entries of an object's action menu, derived from its effective
/// capabilities. `Exit` is always last.
pub fn menu_for(obj: &InteractableObject) -> Vec<MenuAction> {
    let caps = obj.capabilities();
    let mut menu = Vec::new();
    if obj.category.is_grabbable() {
        menu.push(MenuAction::Grab);
    }
    if caps.contains_any(&[Capability::Toggleable, Capability::Door]) {
        menu.push(MenuAction::Toggle);
    }
    if caps.contains(Capability::Sittable) {
        menu.push(MenuAction::Sit);
    }
    if caps.contains(Capability::Rotatable) {
        menu.push(MenuAction::Rotate);
    }
    if caps.contains(Capability::Scalable) {
        menu.push(MenuAction::Scale);
    }
    menu.push(MenuAction::Exit);
    menu
}

/// What the participant's local presentation should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionSignal {
    StateChanged {
        object: ObjectId,
        from: InteractionState,
        to: InteractionState,
    },
    MenuOpened {
        object: ObjectId,
        actions: Vec<MenuAction>,
    },
    SliderChanged {
        object: ObjectId,
        kind: SliderKind,
        value: f32,
    },
    /// A request was denied. Local only; nothing is retried.
    Unavailable {
        object: ObjectId,
        action: MenuAction,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomspace_common::Category;

    #[test]
    fn door_exposes_only_toggle() {
        let door = InteractableObject::new("door", Category::InteractOnly)
            .with_capability(Capability::Door);
        assert_eq!(menu_for(&door), vec![MenuAction::Toggle, MenuAction::Exit]);
    }

    #[test]
    fn heavy_exposes_grab_and_sliders_without_toggle() {
        let crate_ = InteractableObject::new("crate", Category::Heavy);
        assert_eq!(
            menu_for(&crate_),
            vec![
                MenuAction::Grab,
                MenuAction::Rotate,
                MenuAction::Scale,
                MenuAction::Exit
            ]
        );
    }

    #[test]
    fn light_with_toggle_capability() {
        let lamp = InteractableObject::new("lamp", Category::Light)
            .with_capability(Capability::Toggleable);
        assert!(menu_for(&lamp).contains(&MenuAction::Toggle));
        assert!(menu_for(&lamp).contains(&MenuAction::Grab));
    }

    #[test]
    fn chair_is_sittable() {
        let chair = InteractableObject::new("chair", Category::InteractOnly)
            .with_capability(Capability::Sittable);
        assert_eq!(menu_for(&chair), vec![MenuAction::Sit, MenuAction::Exit]);
    }

    #[test]
    fn static_has_only_exit() {
        let wall = InteractableObject::new("wall", Category::Static);
        assert_eq!(menu_for(&wall), vec![MenuAction::Exit]);
    }
}
