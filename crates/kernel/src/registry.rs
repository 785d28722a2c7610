use dashmap::DashMap;
use roomspace_common::{ObjectId, ParticipantId};

use crate::object::InteractableObject;

/// The authoritative catalog of interactable objects.
///
/// Entries are sharded, so two callers working on different objects never
/// wait on each other. All mutations go through [`with_object_mut`], which
/// holds the object's entry for the duration of the closure and makes that
/// closure the single arbitration point for the object.
///
/// [`with_object_mut`]: ObjectRegistry::with_object_mut
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: DashMap<ObjectId, InteractableObject>,
}

impl ObjectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a scene catalog.
    pub fn from_objects(objects: impl IntoIterator<Item = InteractableObject>) -> Self {
        let registry = Self::new();
        for object in objects {
            registry.insert(object);
        }
        registry
    }

    /// Insert (or replace) an object. Returns its id.
    pub fn insert(&self, object: InteractableObject) -> ObjectId {
        let id = object.id;
        tracing::debug!(object = %id, name = %object.name, "object registered");
        self.objects.insert(id, object);
        id
    }

    /// Remove an object. Returns the record if it existed.
    pub fn remove(&self, id: ObjectId) -> Option<InteractableObject> {
        let removed = self.objects.remove(&id).map(|(_, object)| object);
        if removed.is_some() {
            tracing::debug!(object = %id, "object removed");
        }
        removed
    }

    /// True when `id` is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no object is registered.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Copy of an object's current record.
    pub fn get(&self, id: ObjectId) -> Option<InteractableObject> {
        self.objects.get(&id).map(|entry| entry.value().clone())
    }

    /// Read an object without copying it.
    pub fn read<R>(&self, id: ObjectId, f: impl FnOnce(&InteractableObject) -> R) -> Option<R> {
        self.objects.get(&id).map(|entry| f(entry.value()))
    }

    /// Run `f` with exclusive access to one object.
    ///
    /// Returns `None` if the object is not registered.
    pub fn with_object_mut<R>(
        &self,
        id: ObjectId,
        f: impl FnOnce(&mut InteractableObject) -> R,
    ) -> Option<R> {
        self.objects.get_mut(&id).map(|mut entry| f(entry.value_mut()))
    }

    /// Current owner of `id`; `None` when free or unknown.
    pub fn owner_of(&self, id: ObjectId) -> Option<ParticipantId> {
        self.read(id, |o| o.owner_id()).flatten()
    }

    /// All object ids in canonical order.
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Copies of all objects in canonical (id) order.
    pub fn snapshot(&self) -> Vec<InteractableObject> {
        let mut objects: Vec<InteractableObject> =
            self.objects.iter().map(|e| e.value().clone()).collect();
        objects.sort_by_key(|o| o.id);
        objects
    }

    /// Ids of every object currently owned by `participant`, in canonical order.
    pub fn owned_by(&self, participant: ParticipantId) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|e| e.value().is_owned_by(participant))
            .map(|e| *e.key())
            .collect();
        ids.sort();
        ids
    }

    /// Deterministic hash of the replicated state (transform, toggle, owner)
    /// of every object, in canonical order. Two registries that converged hash
    /// equal.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for object in self.snapshot() {
            let t = object.transform;
            mix(&mut h, object.id.0.as_bytes());
            for v in [
                t.position.x,
                t.position.y,
                t.position.z,
                t.rotation.x,
                t.rotation.y,
                t.rotation.z,
                t.rotation.w,
                t.scale.x,
                t.scale.y,
                t.scale.z,
            ] {
                mix(&mut h, &v.to_le_bytes());
            }
            mix(&mut h, &[object.toggled as u8]);
            let owner = object.owner_id().map_or(u64::MAX, |p| p.0);
            mix(&mut h, &owner.to_le_bytes());
        }
        h
    }
}
