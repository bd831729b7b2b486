//! Verified caller identity.
//!
//! Only the verifier can construct an [`AuthenticatedIdentity`]; holding one
//! means the token's signature matched a configured key and it had not
//! expired at verification time. There are no setters.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::jwt::{Claims, KeySlot};

/// A caller whose token has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedIdentity {
    subject: String,
    roles: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    issued_at: i64,
    expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
    #[serde(serialize_with = "serialize_slot")]
    key_slot: KeySlot,
}

impl AuthenticatedIdentity {
    /// Caller must have checked subject, `iat` and `exp` presence already.
    pub(crate) fn from_verified(
        subject: String,
        claims: Claims,
        issued_at: i64,
        expires_at: i64,
        key_slot: KeySlot,
    ) -> Self {
        Self {
            subject,
            roles: claims.role_set(),
            email: claims.email,
            display_name: claims.display_name,
            issued_at,
            expires_at,
            token_id: claims.jti,
            issuer: claims.iss,
            key_slot,
        }
    }

    /// Stable identifier of the principal.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Role names as carried by the token, trimmed. Spellings differing only
    /// in case count as one role; the first one in the token is kept.
    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Seconds since epoch.
    #[must_use]
    pub const fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Seconds since epoch.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// The `jti` claim, if the issuer set one.
    #[must_use]
    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Which configured key verified the signature.
    #[must_use]
    pub const fn key_slot(&self) -> KeySlot {
        self.key_slot
    }
}

#[cfg(test)]
impl AuthenticatedIdentity {
    pub(crate) fn for_tests(subject: &str, roles: &[&str]) -> Self {
        let claims = Claims::new(
            "codex-dominion".to_string(),
            subject.to_string(),
            roles.iter().map(ToString::to_string).collect(),
            0,
            i64::from(u32::MAX),
        );
        let expires_at = claims.exp.unwrap_or_default();
        Self::from_verified(subject.to_string(), claims, 0, expires_at, KeySlot::Primary)
    }
}

fn serialize_slot<S: serde::Serializer>(slot: &KeySlot, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(slot.as_str())
}
