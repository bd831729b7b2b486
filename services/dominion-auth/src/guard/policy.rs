//! Reusable guards and the path-keyed access policy.
//!
//! A [`RoleGuard`] wraps one [`RoleRequirement`]. An [`AccessPolicy`] maps
//! path prefixes (group guards) and exact operation paths (operation guards)
//! to guards; every guard that applies to a path must pass.

use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::error::AuthError;
use crate::guard::roles::{has_any_role, normalize_role};
use crate::identity::AuthenticatedIdentity;
use crate::observability::metrics;

/// "Caller must hold at least one of these roles."
///
/// Stored normalized. An empty requirement is satisfied by nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRequirement {
    roles: BTreeSet<String>,
}

impl RoleRequirement {
    /// Satisfied by holding at least one of `roles`.
    #[must_use]
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|r| normalize_role(r.as_ref()))
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn is_satisfied_by(&self, identity: &AuthenticatedIdentity) -> bool {
        has_any_role(identity, &self.roles)
    }
}

/// A named, reusable role check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    name: String,
    requirement: RoleRequirement,
}

impl RoleGuard {
    pub fn new(name: impl Into<String>, requirement: RoleRequirement) -> Self {
        Self {
            name: name.into(),
            requirement,
        }
    }

    /// Shorthand for `RoleGuard::new(name, RoleRequirement::any_of(roles))`.
    pub fn any_of<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(name, RoleRequirement::any_of(roles))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn requirement(&self) -> &RoleRequirement {
        &self.requirement
    }

    /// Runs the guard. A missing identity is reported before any role check.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Forbidden`.
    pub fn check<'a>(
        &self,
        identity: Option<&'a AuthenticatedIdentity>,
    ) -> Result<&'a AuthenticatedIdentity, AuthError> {
        let Some(identity) = identity else {
            metrics::record_guard_decision(&self.name, "unauthenticated");
            return Err(AuthError::Unauthenticated);
        };

        if self.requirement.is_satisfied_by(identity) {
            metrics::record_guard_decision(&self.name, "allowed");
            Ok(identity)
        } else {
            metrics::record_guard_decision(&self.name, "forbidden");
            warn!(
                guard = %self.name,
                subject = %identity.subject(),
                required = ?self.requirement.roles(),
                "Role guard denied request"
            );
            Err(AuthError::Forbidden {
                required: self.requirement.roles().iter().cloned().collect(),
            })
        }
    }
}

/// Group guards keyed by path prefix plus operation guards keyed by exact path.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    groups: Vec<(String, RoleGuard)>,
    operations: HashMap<String, RoleGuard>,
}

impl AccessPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Guards every path at or below `prefix` (segment-aligned).
    #[must_use]
    pub fn group(mut self, prefix: &str, guard: RoleGuard) -> Self {
        self.groups.push((normalize_path(prefix), guard));
        self
    }

    /// Guards exactly one operation path. Replaces an earlier guard for the same path.
    #[must_use]
    pub fn operation(mut self, path: &str, guard: RoleGuard) -> Self {
        self.operations.insert(normalize_path(path), guard);
        self
    }

    /// Group guards in registration order, then the operation guard.
    #[must_use]
    pub fn guards_for(&self, path: &str) -> Vec<&RoleGuard> {
        let path = normalize_path(path);
        self.groups
            .iter()
            .filter(|(prefix, _)| is_under(&path, prefix))
            .map(|(_, guard)| guard)
            .chain(self.operations.get(&path))
            .collect()
    }

    /// Every path under an access policy needs a verified identity, even
    /// when no role guard applies to it.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, or `Forbidden` from the first guard that fails.
    pub fn authorize<'a>(
        &self,
        path: &str,
        identity: Option<&'a AuthenticatedIdentity>,
    ) -> Result<&'a AuthenticatedIdentity, AuthError> {
        let identity = identity.ok_or(AuthError::Unauthenticated)?;
        for guard in self.guards_for(path) {
            guard.check(Some(identity))?;
        }
        Ok(identity)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}
