//! Role-based authorization.
//!
//! One primitive, [`has_any_role`], composed three ways:
//! - group level: an [`AccessPolicy`] prefix guard or a [`RoleGuardLayer`] over a route group
//! - single operation: an exact-path guard or a layer on one service
//! - in-body: handlers call the helpers in [`roles`] directly

pub mod layer;
pub mod policy;
pub mod roles;

pub use layer::{IdentityCarrier, RoleGuardLayer, RoleGuardService};
pub use policy::{AccessPolicy, RoleGuard, RoleRequirement};
pub use roles::{
    has_any_role, is_admin, is_council, is_operator, is_user, normalize_role, require_any_role,
    require_identity, ADMIN, COUNCIL, OPERATOR, USER,
};
