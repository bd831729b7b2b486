//! Property-based tests for issuance, verification and role matching.

use std::collections::BTreeSet;
use std::sync::Arc;

use dominion_auth::guard::{has_any_role, AccessPolicy, RoleGuard};
use dominion_auth::{AuthError, IssueRequest, SigningKeyPair, TokenIssuer, TokenVerifier};
use proptest::prelude::*;
use secrecy::SecretString;
use test_utils::fixtures::flip_signature_char;
use test_utils::{
    distinct_secrets_strategy, respelled_role_strategy, role_list_strategy, role_strategy,
    secret_strategy, subject_strategy, KNOWN_ROLES,
};

const NOW: i64 = 1_750_000_000;

fn pair(primary: &str, secondary: &str) -> Arc<SigningKeyPair> {
    Arc::new(SigningKeyPair::from_secrets(primary, secondary))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: subject and role set survive issue -> verify.
    #[test]
    fn prop_round_trip_preserves_subject_and_roles(
        subject in subject_strategy(),
        roles in role_list_strategy(),
        (primary, secondary) in distinct_secrets_strategy(),
    ) {
        let keys = pair(&primary, &secondary);
        let token = TokenIssuer::new(keys.clone())
            .issue_token_at(IssueRequest::new(subject.clone(), roles.clone()), NOW)
            .unwrap();
        let identity = TokenVerifier::new(keys).verify_token_at(&token, NOW).unwrap();

        let expected: BTreeSet<String> = roles.into_iter().collect();
        prop_assert_eq!(identity.subject(), subject.as_str());
        prop_assert_eq!(identity.roles(), &expected);
    }

    /// Property: any single-character change in the signature is rejected.
    #[test]
    fn prop_signature_tamper_detected(
        subject in subject_strategy(),
        roles in role_list_strategy(),
        index in 0usize..43,
    ) {
        let keys = pair("tamper-primary-secret", "tamper-secondary-secret");
        let token = TokenIssuer::new(keys.clone())
            .issue_token_at(IssueRequest::new(subject, roles), NOW)
            .unwrap();
        let tampered = flip_signature_char(&token, index);
        prop_assume!(tampered != token);

        let result = TokenVerifier::new(keys).verify_token_at(&tampered, NOW);
        prop_assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    /// Property: a token signed under a demoted primary still verifies.
    #[test]
    fn prop_rotation_keeps_old_tokens_valid(
        subject in subject_strategy(),
        roles in role_list_strategy(),
        (old, new) in distinct_secrets_strategy(),
        stale in secret_strategy(),
    ) {
        let before = SigningKeyPair::from_secrets(old, stale);
        let token = TokenIssuer::new(Arc::new(before.clone()))
            .issue_token_at(IssueRequest::new(subject.clone(), roles), NOW)
            .unwrap();

        let after = Arc::new(before.rotated(SecretString::from(new)));
        let identity = TokenVerifier::new(after).verify_token_at(&token, NOW + 30).unwrap();
        prop_assert_eq!(identity.subject(), subject.as_str());
    }

    /// Property: tokens never verify at or after their expiry.
    #[test]
    fn prop_expiry_enforced(
        minutes in 0u32..120,
        offset in 0i64..10_000,
    ) {
        let keys = pair("expiry-primary-secret", "expiry-secondary-secret");
        let token = TokenIssuer::new(keys.clone())
            .issue_token_at(IssueRequest::new("alice", ["admin"]).expiry_minutes(minutes), NOW)
            .unwrap();
        let at = NOW + offset;
        let result = TokenVerifier::new(keys).verify_token_at(&token, at);

        if at < NOW + i64::from(minutes) * 60 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(
                matches!(result, Err(AuthError::TokenExpired { .. })),
                "expected TokenExpired"
            );
        }
    }

    /// Property: role matching ignores case and surrounding whitespace on both sides.
    #[test]
    fn prop_role_matching_case_insensitive(
        (role, held, wanted) in role_strategy().prop_flat_map(|role| (
            Just(role.clone()),
            respelled_role_strategy(role.clone()),
            respelled_role_strategy(role),
        )),
    ) {
        let keys = pair("case-primary-secret", "case-secondary-secret");
        let token = TokenIssuer::new(keys.clone())
            .issue_token_at(IssueRequest::new("alice", [held]), NOW)
            .unwrap();
        let identity = TokenVerifier::new(keys).verify_token_at(&token, NOW).unwrap();

        prop_assert!(has_any_role(&identity, [wanted]));
        prop_assert!(has_any_role(&identity, [role]));
    }

    /// Property: a group guard rejects callers an operation guard alone would admit.
    #[test]
    fn prop_all_applicable_guards_must_pass(
        group_role in proptest::sample::select(KNOWN_ROLES),
        op_role in proptest::sample::select(KNOWN_ROLES),
    ) {
        prop_assume!(group_role != op_role);
        let keys = pair("guard-primary-secret", "guard-secondary-secret");
        let token = TokenIssuer::new(keys.clone())
            .issue_token_at(IssueRequest::new("alice", [op_role]), NOW)
            .unwrap();
        let identity = TokenVerifier::new(keys).verify_token_at(&token, NOW).unwrap();

        let policy = AccessPolicy::new()
            .group("/ceremonies", RoleGuard::any_of("group", [group_role]))
            .operation("/ceremonies/invoke", RoleGuard::any_of("operation", [op_role]));

        let result = policy.authorize("/ceremonies/invoke", Some(&identity));
        prop_assert!(matches!(result, Err(AuthError::Forbidden { .. })), "expected Forbidden");
    }
}
