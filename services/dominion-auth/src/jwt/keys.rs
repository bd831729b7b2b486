//! Signing key pair for HS256 tokens.
//!
//! The primary key signs and is tried first on verification; the secondary
//! key is only ever used for verification. Both are read-only once built.

use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Which configured key verified a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// The current signing key
    Primary,
    /// The previous signing key kept for rotation
    Secondary,
}

impl KeySlot {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide primary and secondary HMAC secrets.
#[derive(Clone)]
pub struct SigningKeyPair {
    primary_secret: SecretString,
    secondary_secret: SecretString,
    encoding: EncodingKey,
    primary: DecodingKey,
    secondary: DecodingKey,
}

impl SigningKeyPair {
    /// Builds the pair, deriving the jsonwebtoken keys once.
    #[must_use]
    pub fn new(primary: SecretString, secondary: SecretString) -> Self {
        let primary_bytes = primary.expose_secret().as_bytes();
        let secondary_bytes = secondary.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(primary_bytes),
            primary: DecodingKey::from_secret(primary_bytes),
            secondary: DecodingKey::from_secret(secondary_bytes),
            primary_secret: primary,
            secondary_secret: secondary,
        }
    }

    /// Convenience constructor from plain strings.
    #[must_use]
    pub fn from_secrets(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self::new(
            SecretString::from(primary.into()),
            SecretString::from(secondary.into()),
        )
    }

    /// The pair to deploy for a planned rotation: `new_primary` signs,
    /// the current primary is demoted to secondary, the old secondary is dropped.
    #[must_use]
    pub fn rotated(&self, new_primary: SecretString) -> Self {
        Self::new(new_primary, self.primary_secret.clone())
    }

    /// True when both slots hold the same secret, i.e. no rotation is in progress.
    #[must_use]
    pub fn is_single_key(&self) -> bool {
        self.primary_secret.expose_secret() == self.secondary_secret.expose_secret()
    }

    pub(crate) const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Decoding keys in the order verification must try them.
    pub(crate) fn decoding_keys(&self) -> [(KeySlot, &DecodingKey); 2] {
        [
            (KeySlot::Primary, &self.primary),
            (KeySlot::Secondary, &self.secondary),
        ]
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("primary", &"[REDACTED]")
            .field("secondary", &"[REDACTED]")
            .finish()
    }
}
