//! Dominion Auth - token issuance, verification and role guards.
//!
//! This crate provides the authentication core shared by Codex Dominion
//! services:
//! - HS256 token issuance with the primary signing key
//! - Verification with primary/secondary key fallback for zero-downtime rotation
//! - Role guards composable per route group, per operation, or in handler bodies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod jwt;
pub mod observability;

pub use config::{Config, ConfigError};
pub use error::{AuthError, ErrorCode};
pub use guard::{AccessPolicy, RoleGuard, RoleGuardLayer, RoleRequirement};
pub use identity::AuthenticatedIdentity;
pub use jwt::{IssueRequest, KeySlot, SigningKeyPair, TokenIssuer, TokenVerifier};
