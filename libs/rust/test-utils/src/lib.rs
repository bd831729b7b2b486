//! Shared test utilities for dominion-auth.
//!
//! This crate provides:
//! - Proptest generators for subjects, roles and secrets
//! - Fixtures for hand-crafted tokens that bypass the issuer

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use generators::*;
