//! The capability evaluator.
//!
//! A check runs three tiers in order and the first that applies decides:
//!
//! 1. **Admin**: an administrator is always allowed.
//! 2. **Resource**: if the resource carries its own mask, that mask alone
//!    decides. It shadows the actor's mask; the two are never merged.
//! 3. **Actor**: otherwise the actor's own mask decides.
//!
//! A mask satisfies a requirement when every required bit is set.
//!
//! ```
//! use policy::{Actor, Capability, Permissions, Resource, can_perform};
//!
//! let actor = Actor::member(Permissions::MANAGE_USERS);
//! let template = Resource::scoped(Permissions::MANAGE_RESOURCES);
//!
//! assert!(can_perform(&actor, &Resource::unscoped(), Capability::ManageUsers));
//! assert!(!can_perform(&actor, &template, Capability::ManageUsers));
//! ```

use crate::Permissions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity performing a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    pub is_admin: bool,
    pub permissions: Permissions,
}

impl Actor {
    /// Non-admin actor with no permissions. Every non-vacuous check fails.
    pub const fn anonymous() -> Self {
        Self {
            is_admin: false,
            permissions: Permissions::NONE,
        }
    }

    pub const fn admin() -> Self {
        Self {
            is_admin: true,
            permissions: Permissions::NONE,
        }
    }

    pub const fn member(permissions: Permissions) -> Self {
        Self {
            is_admin: false,
            permissions,
        }
    }
}

/// The object a check is scoped to.
///
/// `permissions: None` means the resource defers to the actor's mask.
/// `Some(Permissions::NONE)` is an explicit grant of nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub permissions: Option<Permissions>,
}

impl Resource {
    /// A resource with no override.
    pub const fn unscoped() -> Self {
        Self { permissions: None }
    }

    /// A resource whose mask replaces the actor's for this check.
    pub const fn scoped(permissions: Permissions) -> Self {
        Self {
            permissions: Some(permissions),
        }
    }
}

impl From<Option<Permissions>> for Resource {
    fn from(permissions: Option<Permissions>) -> Self {
        Self { permissions }
    }
}

/// Which rule decided a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Admin,
    Resource,
    Actor,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Admin => "admin",
            Tier::Resource => "resource",
            Tier::Actor => "actor",
        })
    }
}

/// Result of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow { tier: Tier },
    Deny { tier: Tier, missing: Permissions },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub fn tier(&self) -> Tier {
        match *self {
            Decision::Allow { tier } | Decision::Deny { tier, .. } => tier,
        }
    }

    /// Required bits that the deciding mask lacked. Empty on allow.
    pub fn missing(&self) -> Permissions {
        match *self {
            Decision::Allow { .. } => Permissions::NONE,
            Decision::Deny { missing, .. } => missing,
        }
    }
}

/// Evaluate a check and report which tier decided it.
pub fn evaluate(actor: &Actor, resource: &Resource, required: impl Into<Permissions>) -> Decision {
    let required = required.into();

    if actor.is_admin {
        return Decision::Allow { tier: Tier::Admin };
    }

    let (tier, held) = match resource.permissions {
        Some(mask) => (Tier::Resource, mask),
        None => (Tier::Actor, actor.permissions),
    };

    if held.contains(required) {
        Decision::Allow { tier }
    } else {
        Decision::Deny {
            tier,
            missing: required.difference(held),
        }
    }
}

/// Whether `actor` may perform `required` on `resource`.
///
/// `required` is usually a single [`Capability`](crate::Capability); a
/// composite [`Permissions`] set requires every bit in it. An empty set is
/// vacuously satisfied, so callers building sets dynamically must guard
/// against it.
pub fn can_perform(actor: &Actor, resource: &Resource, required: impl Into<Permissions>) -> bool {
    evaluate(actor, resource, required).is_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use proptest::prelude::*;

    fn raw(actor_admin: bool, actor_mask: u32, resource_mask: Option<u32>, cap: u32) -> bool {
        let actor = Actor {
            is_admin: actor_admin,
            permissions: Permissions::from_mask(actor_mask),
        };
        let resource = Resource::from(resource_mask.map(Permissions::from_mask));
        can_perform(&actor, &resource, Permissions::from_mask(cap))
    }

    #[test]
    fn test_admin_without_masks_is_allowed() {
        assert!(raw(true, 0, None, 8));
    }

    #[test]
    fn test_resource_mask_grants_missing_actor_bit() {
        assert!(raw(false, 0, Some(8), 8));
    }

    #[test]
    fn test_resource_mask_shadows_actor_mask() {
        assert!(!raw(false, 8, Some(4), 8));
    }

    #[test]
    fn test_actor_mask_used_without_override() {
        assert!(raw(false, 8, None, 8));
    }

    #[test]
    fn test_actor_mask_lacking_bit_is_denied() {
        assert!(!raw(false, 8, None, 2));
    }

    #[test]
    fn test_explicit_empty_override_denies() {
        let actor = Actor::member(Permissions::all());
        let resource = Resource::scoped(Permissions::NONE);
        let decision = evaluate(&actor, &resource, Capability::RunTasks);
        assert_eq!(
            decision,
            Decision::Deny {
                tier: Tier::Resource,
                missing: Permissions::RUN_TASKS,
            }
        );
    }

    #[test]
    fn test_composite_requires_every_bit() {
        let actor = Actor::member(Permissions::RUN_TASKS | Permissions::UPDATE_PROJECT);
        let required = Permissions::RUN_TASKS | Permissions::MANAGE_USERS;
        let decision = evaluate(&actor, &Resource::unscoped(), required);
        assert_eq!(decision.tier(), Tier::Actor);
        assert_eq!(decision.missing(), Permissions::MANAGE_USERS);
    }

    #[test]
    fn test_empty_requirement_is_vacuous() {
        assert!(can_perform(&Actor::anonymous(), &Resource::unscoped(), Permissions::NONE));
    }

    #[test]
    fn test_anonymous_fails_closed() {
        for cap in Capability::ALL {
            assert!(!can_perform(&Actor::anonymous(), &Resource::unscoped(), cap));
        }
    }

    #[test]
    fn test_admin_tier_reported() {
        let decision = evaluate(
            &Actor::admin(),
            &Resource::scoped(Permissions::NONE),
            Capability::ManageUsers,
        );
        assert_eq!(decision, Decision::Allow { tier: Tier::Admin });
    }

    fn capability() -> impl Strategy<Value = Capability> {
        prop::sample::select(Capability::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn admin_always_allowed(
            actor_mask in any::<u32>(),
            resource in any::<Option<u32>>(),
            cap in capability(),
        ) {
            prop_assert!(raw(true, actor_mask, resource, cap.bit().mask()));
        }

        #[test]
        fn override_ignores_actor_mask(
            a in any::<u32>(),
            b in any::<u32>(),
            resource in any::<u32>(),
            cap in capability(),
        ) {
            prop_assert_eq!(
                raw(false, a, Some(resource), cap.bit().mask()),
                raw(false, b, Some(resource), cap.bit().mask())
            );
        }

        #[test]
        fn fallback_is_bitwise(actor_mask in any::<u32>(), required in any::<u32>()) {
            let expected = {
                let held = Permissions::from_mask(actor_mask).mask();
                let req = Permissions::from_mask(required).mask();
                held & req == req
            };
            prop_assert_eq!(raw(false, actor_mask, None, required), expected);
        }

        #[test]
        fn repeated_checks_agree(
            admin in any::<bool>(),
            a in any::<u32>(),
            r in any::<Option<u32>>(),
            cap in capability(),
        ) {
            let first = raw(admin, a, r, cap.bit().mask());
            let second = raw(admin, a, r, cap.bit().mask());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn adding_bits_never_revokes(
            m1 in any::<u32>(),
            extra in any::<u32>(),
            resource_scoped in any::<bool>(),
            required in any::<u32>(),
        ) {
            let m2 = m1 | extra;
            let (lo, hi) = if resource_scoped {
                (raw(false, 0, Some(m1), required), raw(false, 0, Some(m2), required))
            } else {
                (raw(false, m1, None, required), raw(false, m2, None, required))
            };
            prop_assert!(!lo || hi);
        }

        #[test]
        fn high_bits_ignored(actor_mask in any::<u32>(), cap in capability()) {
            prop_assert_eq!(
                raw(false, actor_mask, None, cap.bit().mask()),
                raw(false, actor_mask & 0xF, None, cap.bit().mask())
            );
        }
    }
}
