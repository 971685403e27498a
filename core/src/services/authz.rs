//! Role-based authorization decisions
//!
//! Authorization is a pure function over a required role set and the
//! request's principal. Role sets are plain values registered against
//! protected actions at composition time; nothing here is discovered
//! dynamically at request time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::entities::principal::{Principal, Role};

/// An ordered set of roles permitted to perform an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    /// Builds a role set from a slice of roles
    pub fn of(roles: &[Role]) -> Self {
        Self {
            roles: roles.iter().copied().collect(),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbidden,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides whether the principal may perform an action guarded by the
/// required role set. Stateless and order-independent.
///
/// An absent principal (verification did not run or did not succeed) is
/// `Forbidden` — never allow-by-default.
pub fn authorize(required: &RoleSet, principal: Option<&Principal>) -> Decision {
    match principal {
        Some(p) if required.contains(p.role) => Decision::Allow,
        _ => Decision::Forbidden,
    }
}

/// Static mapping from protected action to its permitted roles.
///
/// Built once at composition time and immutable at runtime.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    actions: BTreeMap<String, RoleSet>,
}

impl AuthorizationPolicy {
    pub fn builder() -> AuthorizationPolicyBuilder {
        AuthorizationPolicyBuilder::default()
    }

    /// The role set registered for an action, if any
    pub fn required_for(&self, action: &str) -> Option<&RoleSet> {
        self.actions.get(action)
    }

    /// Full decision for an action. An unregistered action is `Forbidden`.
    pub fn check(&self, action: &str, principal: Option<&Principal>) -> Decision {
        match self.required_for(action) {
            Some(required) => authorize(required, principal),
            None => Decision::Forbidden,
        }
    }
}

/// Builder collecting action registrations before the policy is frozen
#[derive(Debug, Default)]
pub struct AuthorizationPolicyBuilder {
    actions: BTreeMap<String, RoleSet>,
}

impl AuthorizationPolicyBuilder {
    /// Register a protected action with its permitted roles
    pub fn action(mut self, name: impl Into<String>, roles: RoleSet) -> Self {
        self.actions.insert(name.into(), roles);
        self
    }

    pub fn build(self) -> AuthorizationPolicy {
        AuthorizationPolicy {
            actions: self.actions,
        }
    }
}
