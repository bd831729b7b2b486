//! Token fixtures.
//!
//! These build tokens directly with jsonwebtoken so tests can produce
//! payloads the real issuer refuses to create.

use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// Primary secret used by fixtures.
pub const PRIMARY_SECRET: &str = "fixture-primary-secret-0123456789";

/// Secondary secret used by fixtures.
pub const SECONDARY_SECRET: &str = "fixture-secondary-secret-9876543210";

/// A secret no fixture key pair contains.
pub const FOREIGN_SECRET: &str = "fixture-foreign-secret-not-configured";

/// Current unix time in seconds.
#[must_use]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Sign an arbitrary JSON payload with HS256.
///
/// # Panics
///
/// Panics if encoding fails, which only happens for unserializable input.
#[must_use]
#[allow(clippy::expect_used)]
pub fn forge_token(claims: &Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("fixture token encoding")
}

/// Build an unsigned `alg: none` token.
#[must_use]
pub fn unsigned_token(claims: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(claims.to_string());
    format!("{header}.{payload}.")
}

/// Claims that are valid for an hour but carry no subject.
#[must_use]
pub fn claims_without_subject() -> Value {
    let now = now();
    json!({
        "iss": "codex-dominion",
        "roles": ["admin"],
        "iat": now,
        "exp": now + 3600,
    })
}

/// Complete claims for `subject` valid for an hour.
#[must_use]
pub fn claims_for(subject: &str, roles: Value) -> Value {
    let now = now();
    json!({
        "iss": "codex-dominion",
        "sub": subject,
        "roles": roles,
        "iat": now,
        "exp": now + 3600,
    })
}

/// Replace the character at `index` of the signature segment with a different
/// base64url character.
///
/// # Panics
///
/// Panics if the token has no signature segment or `index` is out of range.
#[must_use]
#[allow(clippy::expect_used)]
pub fn flip_signature_char(token: &str, index: usize) -> String {
    let (message, signature) = token.rsplit_once('.').expect("token has a signature segment");
    let mut chars: Vec<char> = signature.chars().collect();
    let original = chars[index];
    chars[index] = if original == 'A' { 'B' } else { 'A' };
    format!("{message}.{}", chars.into_iter().collect::<String>())
}
