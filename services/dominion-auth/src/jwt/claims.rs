//! JWT payload and role-claim decoding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::guard::normalize_role;

/// Trimmed, non-blank roles with case-insensitive duplicates collapsed.
///
/// The first spelling seen for a role is the one kept.
pub(crate) fn distinct_roles<'a, I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .filter(|role| seen.insert(normalize_role(role)))
        .map(str::to_string)
        .collect()
}

/// Role claim as it appears on the wire.
///
/// Issued tokens always carry a list; older issuers wrote a comma-joined
/// string, so both shapes are accepted on the way in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleClaim {
    /// `"roles": ["admin", "council"]`
    List(Vec<String>),
    /// `"roles": "admin,council"`
    Joined(String),
}

impl RoleClaim {
    /// Trimmed, non-blank role names.
    pub fn names(&self) -> Vec<&str> {
        let parts: Vec<&str> = match self {
            Self::List(roles) => roles.iter().map(String::as_str).collect(),
            Self::Joined(joined) => joined.split(',').collect(),
        };
        parts.into_iter().map(str::trim).filter(|r| !r.is_empty()).collect()
    }
}

/// JWT payload.
///
/// Every field is optional so that a correctly signed payload always
/// decodes; the verifier decides which absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Principal identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expires at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Unique token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Granted roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleClaim>,
    /// Legacy single-role claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Claims {
    /// Claims for a fresh token valid for `ttl_seconds` from `now`.
    pub fn new(issuer: String, subject: String, roles: Vec<String>, now: i64, ttl_seconds: i64) -> Self {
        Self {
            iss: Some(issuer),
            sub: Some(subject),
            iat: Some(now),
            exp: Some(now.saturating_add(ttl_seconds)),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            roles: Some(RoleClaim::List(roles)),
            ..Self::default()
        }
    }

    /// Sets the `email` claim.
    #[must_use]
    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    /// Sets the `display_name` claim.
    #[must_use]
    pub fn with_display_name(mut self, display_name: String) -> Self {
        self.display_name = Some(display_name);
        self
    }

    /// The subject if present and not blank.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Union of `roles` and the legacy `role` claim, duplicates collapsed
    /// regardless of case.
    pub fn role_set(&self) -> BTreeSet<String> {
        distinct_roles(self.roles.iter().chain(self.role.iter()).flat_map(RoleClaim::names))
    }

    /// Expired when `exp` is at or before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_none_or(|exp| exp <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(
            "codex-dominion".to_string(),
            "alice".to_string(),
            vec!["admin".to_string()],
            1_000,
            3_600,
        );

        assert_eq!(claims.iss.as_deref(), Some("codex-dominion"));
        assert_eq!(claims.subject(), Some("alice"));
        assert_eq!(claims.exp, Some(4_600));
        assert!(claims.jti.is_some());
        assert!(!claims.is_expired_at(4_599));
        assert!(claims.is_expired_at(4_600));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let claims = Claims::new("iss".to_string(), "bob".to_string(), vec!["user".to_string()], 0, 60);
        let json = serde_json::to_value(&claims).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("email"));
        assert!(!obj.contains_key("display_name"));
        assert!(!obj.contains_key("role"));
    }

    #[test]
    fn test_joined_roles_are_split() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"carol","roles":" admin , council,,"}"#).unwrap();
        let roles: Vec<String> = claims.role_set().into_iter().collect();
        assert_eq!(roles, vec!["admin".to_string(), "council".to_string()]);
    }

    #[test]
    fn test_legacy_role_claim_merged() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"dave","roles":["operator"],"role":"user"}"#).unwrap();
        assert_eq!(claims.role_set().len(), 2);
        assert!(claims.role_set().contains("user"));
    }

    #[test]
    fn test_case_variants_collapse_to_first_spelling() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"erin","roles":["Admin"," admin","ADMIN"],"role":"admin"}"#)
                .unwrap();
        let roles: Vec<String> = claims.role_set().into_iter().collect();
        assert_eq!(roles, vec!["Admin".to_string()]);
    }

    #[test]
    fn test_blank_subject_is_absent() {
        let claims: Claims = serde_json::from_str(r#"{"sub":"   "}"#).unwrap();
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_missing_exp_counts_as_expired() {
        let claims = Claims::default();
        assert!(claims.is_expired_at(0));
    }
}
