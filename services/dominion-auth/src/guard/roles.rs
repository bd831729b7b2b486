//! Role matching primitive and in-body helpers.
//!
//! Every check is exact set membership after trimming and lower-casing.
//! Roles do not inherit from each other: an admin is not a council member
//! unless the token says so.

use crate::error::AuthError;
use crate::identity::AuthenticatedIdentity;

/// Full administrative access.
pub const ADMIN: &str = "admin";
/// Governance council.
pub const COUNCIL: &str = "council";
/// Day-to-day operators.
pub const OPERATOR: &str = "operator";
/// Ordinary signed-in users.
pub const USER: &str = "user";

/// Canonical form used for every comparison.
#[must_use]
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

/// True iff the identity holds at least one of `required`.
pub fn has_any_role<I, S>(identity: &AuthenticatedIdentity, required: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    required.into_iter().any(|wanted| {
        let wanted = normalize_role(wanted.as_ref());
        !wanted.is_empty() && identity.roles().iter().any(|held| normalize_role(held) == wanted)
    })
}

/// Holds `admin`.
#[must_use]
pub fn is_admin(identity: &AuthenticatedIdentity) -> bool {
    has_any_role(identity, [ADMIN])
}

/// Holds `council`. Admins are not implicitly council members.
#[must_use]
pub fn is_council(identity: &AuthenticatedIdentity) -> bool {
    has_any_role(identity, [COUNCIL])
}

/// Holds `operator`.
#[must_use]
pub fn is_operator(identity: &AuthenticatedIdentity) -> bool {
    has_any_role(identity, [OPERATOR])
}

/// Holds `user`.
#[must_use]
pub fn is_user(identity: &AuthenticatedIdentity) -> bool {
    has_any_role(identity, [USER])
}

/// Turns an optional identity into a hard requirement.
///
/// # Errors
///
/// `Unauthenticated` when no identity was established.
pub fn require_identity(
    identity: Option<&AuthenticatedIdentity>,
) -> Result<&AuthenticatedIdentity, AuthError> {
    identity.ok_or(AuthError::Unauthenticated)
}

/// Passes the identity through when it holds any of `required`.
///
/// # Errors
///
/// `Forbidden` listing the roles that would have been accepted.
pub fn require_any_role<I, S>(
    identity: &AuthenticatedIdentity,
    required: I,
) -> Result<&AuthenticatedIdentity, AuthError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let required: Vec<String> = required.into_iter().map(|r| normalize_role(r.as_ref())).collect();
    if has_any_role(identity, &required) {
        Ok(identity)
    } else {
        Err(AuthError::Forbidden { required })
    }
}
