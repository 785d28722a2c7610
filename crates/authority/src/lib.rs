//! Ownership Authority: grants and revokes exclusive control of an object to
//! one participant at a time.
//!
//! # Invariants
//! - A request is granted iff the object is unowned or already owned by the
//!   requester (idempotent).
//! - Decisions for one object are serialized by the registry entry lock;
//!   decisions for different objects never wait on each other.
//! - Ownership never expires on its own.

use roomspace_common::{ObjectId, ParticipantId};
use roomspace_kernel::{AxisLocks, InteractableObject, ObjectRegistry, OwnershipRecord};

/// Why an ownership request or release was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("object {object} is already owned by {owner}")]
    AlreadyOwned {
        object: ObjectId,
        owner: ParticipantId,
    },
    #[error("{participant} does not own object {object}")]
    NotOwner {
        object: ObjectId,
        participant: ParticipantId,
    },
    #[error("object {0} cannot be grabbed")]
    NotGrabbable(ObjectId),
    #[error("object {0} is not in the registry")]
    MissingReference(ObjectId),
}

/// Successful ownership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub record: OwnershipRecord,
    /// False when the requester already held the object.
    pub fresh: bool,
}

/// How an ownership record ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The owner let go.
    Released,
    /// The owner departed and the reaper took the object back.
    Revoked,
}

/// Arbitration point for object ownership.
///
/// Stateless apart from the registry it arbitrates over; the ownership
/// record lives on the object itself.
pub struct OwnershipAuthority<'r> {
    registry: &'r ObjectRegistry,
}

impl<'r> OwnershipAuthority<'r> {
    /// Arbitrate ownership of the objects in `registry`.
    pub fn new(registry: &'r ObjectRegistry) -> Self {
        Self { registry }
    }

    /// Request exclusive control of `object` for `participant`.
    ///
    /// On a fresh grant the object's physics flips to controlled and
    /// `on_grant` runs while the object is still locked, so side effects such
    /// as event publication are ordered with the decision.
    pub fn request(
        &self,
        object: ObjectId,
        participant: ParticipantId,
        tick: u64,
        on_grant: impl FnOnce(&mut InteractableObject, &OwnershipRecord),
    ) -> Result<Grant, OwnershipError> {
        let outcome = self
            .registry
            .with_object_mut(object, |obj| {
                if !obj.category.is_grabbable() {
                    return Err(OwnershipError::NotGrabbable(object));
                }
                match obj.owner {
                    Some(record) if record.participant == participant => Ok(Grant {
                        record,
                        fresh: false,
                    }),
                    Some(record) => Err(OwnershipError::AlreadyOwned {
                        object,
                        owner: record.participant,
                    }),
                    None => {
                        let record = OwnershipRecord {
                            object,
                            participant,
                            acquired_tick: tick,
                        };
                        obj.owner = Some(record);
                        obj.physics.suspend(AxisLocks::for_category(obj.category));
                        on_grant(obj, &record);
                        Ok(Grant {
                            record,
                            fresh: true,
                        })
                    }
                }
            })
            .unwrap_or(Err(OwnershipError::MissingReference(object)));

        match &outcome {
            Ok(grant) if grant.fresh => {
                tracing::debug!(object = %object, participant = %participant, "ownership granted");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(object = %object, participant = %participant, reason = %e, "ownership denied");
            }
        }
        outcome
    }

    /// Give up control of `object`. Only the current owner may release.
    ///
    /// The object is freed where it stands: physics is restored and nothing
    /// else about its transform changes.
    pub fn release(
        &self,
        object: ObjectId,
        participant: ParticipantId,
        on_release: impl FnOnce(&mut InteractableObject, &OwnershipRecord),
    ) -> Result<OwnershipRecord, OwnershipError> {
        self.end(object, participant, ReleaseReason::Released, on_release)
    }

    /// Release on behalf of a departed owner.
    pub fn revoke(
        &self,
        object: ObjectId,
        participant: ParticipantId,
        on_revoke: impl FnOnce(&mut InteractableObject, &OwnershipRecord),
    ) -> Result<OwnershipRecord, OwnershipError> {
        self.end(object, participant, ReleaseReason::Revoked, on_revoke)
    }

    /// Current owner of `object`, if any.
    pub fn owner(&self, object: ObjectId) -> Option<ParticipantId> {
        self.registry.owner_of(object)
    }

    fn end(
        &self,
        object: ObjectId,
        participant: ParticipantId,
        reason: ReleaseReason,
        on_end: impl FnOnce(&mut InteractableObject, &OwnershipRecord),
    ) -> Result<OwnershipRecord, OwnershipError> {
        let outcome = self
            .registry
            .with_object_mut(object, |obj| match obj.owner {
                Some(record) if record.participant == participant => {
                    obj.owner = None;
                    obj.physics.restore();
                    on_end(obj, &record);
                    Ok(record)
                }
                _ => Err(OwnershipError::NotOwner {
                    object,
                    participant,
                }),
            })
            .unwrap_or(Err(OwnershipError::MissingReference(object)));

        if outcome.is_ok() {
            tracing::debug!(object = %object, participant = %participant, ?reason, "ownership ended");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomspace_common::Category;
    use roomspace_kernel::PhysicsMode;
    use std::sync::Barrier;

    const A: ParticipantId = ParticipantId(1);
    const B: ParticipantId = ParticipantId(2);

    fn registry_with(category: Category) -> (ObjectRegistry, ObjectId) {
        let registry = ObjectRegistry::new();
        let id = registry.insert(InteractableObject::new("thing", category));
        (registry, id)
    }

    #[test]
    fn grant_unowned() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        let grant = authority.request(x, A, 5, |_, _| {}).unwrap();
        assert!(grant.fresh);
        assert_eq!(grant.record.participant, A);
        assert_eq!(grant.record.acquired_tick, 5);
        assert_eq!(authority.owner(x), Some(A));
    }

    #[test]
    fn grant_flips_physics_to_controlled() {
        let (registry, x) = registry_with(Category::Heavy);
        let authority = OwnershipAuthority::new(&registry);
        authority.request(x, A, 0, |_, _| {}).unwrap();
        let physics = registry.get(x).unwrap().physics;
        assert_eq!(physics.mode, PhysicsMode::Controlled);
        assert_eq!(physics.locks, AxisLocks::PLANAR);
    }

    #[test]
    fn re_request_by_owner_is_noop() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        authority.request(x, A, 1, |_, _| {}).unwrap();
        let mut hook_ran = false;
        let again = authority.request(x, A, 9, |_, _| hook_ran = true).unwrap();
        assert!(!again.fresh);
        assert_eq!(again.record.acquired_tick, 1);
        assert!(!hook_ran);
    }

    #[test]
    fn second_requester_denied() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        authority.request(x, A, 0, |_, _| {}).unwrap();
        let err = authority.request(x, B, 0, |_, _| {}).unwrap_err();
        assert_eq!(err, OwnershipError::AlreadyOwned { object: x, owner: A });
    }

    #[test]
    fn non_grabbable_denied() {
        let (registry, x) = registry_with(Category::InteractOnly);
        let authority = OwnershipAuthority::new(&registry);
        assert_eq!(
            authority.request(x, A, 0, |_, _| {}),
            Err(OwnershipError::NotGrabbable(x))
        );
        assert_eq!(authority.owner(x), None);
    }

    #[test]
    fn missing_object_denied() {
        let registry = ObjectRegistry::new();
        let authority = OwnershipAuthority::new(&registry);
        let ghost = ObjectId::new();
        assert_eq!(
            authority.request(ghost, A, 0, |_, _| {}),
            Err(OwnershipError::MissingReference(ghost))
        );
        assert_eq!(
            authority.release(ghost, A, |_, _| {}),
            Err(OwnershipError::MissingReference(ghost))
        );
    }

    #[test]
    fn release_by_non_owner_denied() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        authority.request(x, A, 0, |_, _| {}).unwrap();
        assert_eq!(
            authority.release(x, B, |_, _| {}),
            Err(OwnershipError::NotOwner { object: x, participant: B })
        );
        assert_eq!(authority.owner(x), Some(A));
    }

    #[test]
    fn release_is_idempotent() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        let before = registry.get(x).unwrap();
        for _ in 0..3 {
            assert_eq!(
                authority.release(x, A, |_, _| {}),
                Err(OwnershipError::NotOwner { object: x, participant: A })
            );
        }
        assert_eq!(registry.get(x).unwrap(), before);
    }

    #[test]
    fn grant_release_round_trip_restores_state() {
        let (registry, x) = registry_with(Category::Heavy);
        let authority = OwnershipAuthority::new(&registry);
        let before = registry.get(x).unwrap();
        authority.request(x, A, 3, |_, _| {}).unwrap();
        authority.release(x, A, |_, _| {}).unwrap();
        assert_eq!(registry.get(x).unwrap(), before);
    }

    #[test]
    fn revoke_frees_for_others() {
        let (registry, x) = registry_with(Category::Light);
        let authority = OwnershipAuthority::new(&registry);
        authority.request(x, A, 0, |_, _| {}).unwrap();
        authority.revoke(x, A, |_, _| {}).unwrap();
        assert!(authority.request(x, B, 1, |_, _| {}).unwrap().fresh);
    }

    #[test]
    fn simultaneous_requests_single_winner() {
        let (registry, x) = registry_with(Category::Light);
        let barrier = Barrier::new(2);
        let results: Vec<Result<Grant, OwnershipError>> = std::thread::scope(|s| {
            let handles: Vec<_> = [A, B]
                .into_iter()
                .map(|p| {
                    let registry = &registry;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        OwnershipAuthority::new(registry).request(x, p, 0, |_, _| {})
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let granted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(granted, 1);
        let denied = results
            .iter()
            .filter(|r| matches!(r, Err(OwnershipError::AlreadyOwned { .. })))
            .count();
        assert_eq!(denied, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Request(usize, u64),
            Release(usize, u64),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..4, 1u64..5).prop_map(|(o, p)| Op::Request(o, p)),
                (0usize..4, 1u64..5).prop_map(|(o, p)| Op::Release(o, p)),
            ]
        }

        proptest! {
            /// Whatever the interleaving, each object has at most one owner and
            /// that owner is the last participant granted and not yet released.
            #[test]
            fn prop_single_owner_per_object(ops in prop::collection::vec(op_strategy(), 1..64)) {
                let registry = ObjectRegistry::new();
                let ids: Vec<ObjectId> = (0..4)
                    .map(|_| registry.insert(InteractableObject::new("o", Category::Light)))
                    .collect();
                let authority = OwnershipAuthority::new(&registry);
                let mut model: Vec<Option<ParticipantId>> = vec![None; 4];

                for op in ops {
                    match op {
                        Op::Request(o, p) => {
                            let p = ParticipantId(p);
                            let result = authority.request(ids[o], p, 0, |_, _| {});
                            if model[o].is_none() || model[o] == Some(p) {
                                prop_assert!(result.is_ok());
                                model[o] = Some(p);
                            } else {
                                prop_assert!(result.is_err());
                            }
                        }
                        Op::Release(o, p) => {
                            let p = ParticipantId(p);
                            let result = authority.release(ids[o], p, |_, _| {});
                            if model[o] == Some(p) {
                                prop_assert!(result.is_ok());
                                model[o] = None;
                            } else {
                                prop_assert!(result.is_err());
                            }
                        }
                    }
                    for (i, id) in ids.iter().enumerate() {
                        prop_assert_eq!(registry.owner_of(*id), model[i]);
                    }
                }
            }

            /// Concurrent grant attempts from many threads yield exactly one owner.
            #[test]
            fn prop_concurrent_grants_single_owner(contenders in 2usize..8) {
                let registry = ObjectRegistry::new();
                let x = registry.insert(InteractableObject::new("x", Category::Light));
                let barrier = Barrier::new(contenders);
                let granted: usize = std::thread::scope(|s| {
                    let handles: Vec<_> = (0..contenders)
                        .map(|i| {
                            let registry = &registry;
                            let barrier = &barrier;
                            s.spawn(move || {
                                barrier.wait();
                                OwnershipAuthority::new(registry)
                                    .request(x, ParticipantId(i as u64), 0, |_, _| {})
                                    .is_ok()
                            })
                        })
                        .collect();
                    handles.into_iter().map(|h| h.join().unwrap() as usize).sum()
                });
                prop_assert_eq!(granted, 1);
                prop_assert!(registry.owner_of(x).is_some());
            }
        }
    }
}
