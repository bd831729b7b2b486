//! Shared proptest generators.

use proptest::prelude::*;

/// Role names used across the Codex Dominion services.
pub const KNOWN_ROLES: &[&str] = &["admin", "council", "operator", "user"];

/// Generate non-blank subject identifiers, some with surrounding whitespace.
pub fn subject_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_.-]{2,30}",
        "[ \t]{1,3}[a-z][a-z0-9_.-]{2,30}[ \t]{0,3}",
        "[a-z0-9._%+-]{1,16}@[a-z0-9-]{2,12}\\.[a-z]{2,4}",
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    ]
}

/// Generate a single role name, known or arbitrary.
pub fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => proptest::sample::select(KNOWN_ROLES).prop_map(str::to_string),
        1 => "[a-z][a-z_-]{2,15}",
    ]
}

/// Generate a non-empty role list, possibly with duplicates.
pub fn role_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(role_strategy(), 1..6)
}

/// Re-spell a role with random casing and surrounding whitespace.
pub fn respelled_role_strategy(role: String) -> impl Strategy<Value = String> {
    (
        prop::collection::vec(any::<bool>(), role.len()),
        "[ \t]{0,3}",
        "[ \t]{0,3}",
    )
        .prop_map(move |(upper, lead, trail)| {
            let body: String = role
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{lead}{body}{trail}")
        })
}

/// Generate HMAC secrets.
pub fn secret_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#%^&*_-]{16,64}"
}

/// Generate two distinct secrets.
pub fn distinct_secrets_strategy() -> impl Strategy<Value = (String, String)> {
    (secret_strategy(), secret_strategy()).prop_filter("secrets must differ", |(a, b)| a != b)
}
