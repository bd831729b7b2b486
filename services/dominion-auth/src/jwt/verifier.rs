//! Token verification with dual-key fallback.
//!
//! The signature is checked against the primary key, then the secondary.
//! Only once a key has matched is the payload decoded, so a signature
//! failure can never be confused with a claims problem.

use base64::Engine;
use jsonwebtoken::{crypto, decode_header, Algorithm};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::AuthError;
use crate::identity::AuthenticatedIdentity;
use crate::jwt::claims::Claims;
use crate::jwt::keys::{KeySlot, SigningKeyPair};
use crate::observability::metrics;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Verifies tokens against a [`SigningKeyPair`].
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<SigningKeyPair>,
}

impl TokenVerifier {
    /// Verifier trying the primary key of `keys` before the secondary.
    #[must_use]
    pub const fn new(keys: Arc<SigningKeyPair>) -> Self {
        Self { keys }
    }

    /// Verifies `token` using the system clock.
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `TokenExpired` or `MalformedToken`.
    pub fn verify_token(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        self.verify_token_at(token, chrono::Utc::now().timestamp())
    }

    /// Verifies `token` as if the current time were `now` (seconds since epoch).
    ///
    /// # Errors
    ///
    /// `InvalidToken`, `TokenExpired` or `MalformedToken`.
    pub fn verify_token_at(&self, token: &str, now: i64) -> Result<AuthenticatedIdentity, AuthError> {
        let result = self.verify_inner(token, now);
        match &result {
            Ok(identity) => {
                metrics::record_verification("success", identity.key_slot().as_str());
                if identity.key_slot() == KeySlot::Secondary {
                    info!(subject = %identity.subject(), "Token verified with secondary key");
                }
            }
            Err(AuthError::InvalidToken) => {
                metrics::record_verification("invalid", "none");
                debug!("Token signature did not match any configured key");
            }
            Err(e @ AuthError::TokenExpired { .. }) => {
                info!(error = %e, "Rejected expired token");
            }
            Err(e) => {
                error!(error = %e, "Token signed by a configured key is missing required claims");
            }
        }
        result
    }

    fn verify_inner(&self, token: &str, now: i64) -> Result<AuthenticatedIdentity, AuthError> {
        let (slot, payload) = self.verify_signature(token)?;

        let claims = decode_payload(payload).inspect_err(|_| {
            metrics::record_verification("malformed", slot.as_str());
        })?;

        let outcome = check_claims(claims, now, slot);
        match &outcome {
            Err(AuthError::TokenExpired { .. }) => metrics::record_verification("expired", slot.as_str()),
            Err(_) => metrics::record_verification("malformed", slot.as_str()),
            Ok(_) => {}
        }
        outcome
    }

    /// Returns the matching key slot and the still-encoded payload segment.
    fn verify_signature<'t>(&self, token: &'t str) -> Result<(KeySlot, &'t str), AuthError> {
        let mut parts = token.rsplitn(2, '.');
        let (Some(signature), Some(message)) = (parts.next(), parts.next()) else {
            return Err(AuthError::InvalidToken);
        };
        let Some((_, payload)) = message.split_once('.') else {
            return Err(AuthError::InvalidToken);
        };

        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::InvalidToken);
        }

        self.keys
            .decoding_keys()
            .into_iter()
            .find(|(_, key)| {
                crypto::verify(signature, message.as_bytes(), key, ALGORITHM).unwrap_or(false)
            })
            .map(|(slot, _)| (slot, payload))
            .ok_or(AuthError::InvalidToken)
    }
}

fn decode_payload(payload: &str) -> Result<Claims, AuthError> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::malformed("payload is not valid base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::malformed("payload is not a claim object"))
}

fn check_claims(claims: Claims, now: i64, slot: KeySlot) -> Result<AuthenticatedIdentity, AuthError> {
    let Some(exp) = claims.exp else {
        return Err(AuthError::malformed("missing exp claim"));
    };
    if claims.is_expired_at(now) {
        return Err(AuthError::expired_at(exp));
    }
    let Some(iat) = claims.iat else {
        return Err(AuthError::malformed("missing iat claim"));
    };
    let Some(subject) = claims.subject().map(str::to_string) else {
        return Err(AuthError::malformed("missing sub claim"));
    };

    Ok(AuthenticatedIdentity::from_verified(subject, claims, iat, exp, slot))
}
