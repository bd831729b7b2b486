//! Token issuance and dual-key verification.

pub mod claims;
pub mod issuer;
pub mod keys;
pub mod verifier;

pub use claims::{Claims, RoleClaim};
pub use issuer::{IssueRequest, TokenIssuer};
pub use keys::{KeySlot, SigningKeyPair};
pub use verifier::TokenVerifier;
