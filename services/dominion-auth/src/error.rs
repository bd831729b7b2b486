//! Error handling module with typed, non-exhaustive authentication errors
//!
//! Every failure of issuance, verification or a guard check is a distinct
//! variant so callers can map it to the right response:
//! - `TokenExpired` is separated from `TokenInvalid` so clients can re-login quietly
//! - `Unauthenticated` and `Forbidden` map to 401 and 403 respectively
//! - Messages never include token or secret material

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Non-exhaustive error enum for forward compatibility
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthError {
    /// Issuance parameters were rejected before signing
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input
        reason: String,
    },

    /// Signature did not verify under either configured key
    #[error("Token signature invalid")]
    InvalidToken,

    /// Signature verified but the expiry has passed
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },

    /// Signature verified but required claims are missing or unusable
    #[error("Token malformed: {reason}")]
    MalformedToken {
        /// Which claim was missing or unusable
        reason: String,
    },

    /// No verified identity is available for the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Identity is verified but holds none of the required roles
    #[error("Forbidden: requires one of {required:?}")]
    Forbidden {
        /// The roles that would have satisfied the guard
        required: Vec<String>,
    },

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Caller passed bad input to the issuer
    InvalidArgument,
    /// No configured key signed the token
    TokenInvalid,
    /// Signature valid, token past its expiry
    TokenExpired,
    /// Signature valid, required claims missing or unreadable
    TokenMalformed,
    /// No identity on the request
    Unauthenticated,
    /// Identity lacks every required role
    Forbidden,
    /// Unexpected failure
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "AUTH_INVALID_ARGUMENT",
            Self::TokenInvalid => "AUTH_TOKEN_INVALID",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::TokenMalformed => "AUTH_TOKEN_MALFORMED",
            Self::Unauthenticated => "AUTH_UNAUTHENTICATED",
            Self::Forbidden => "AUTH_FORBIDDEN",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::TokenInvalid
            | Self::TokenExpired
            | Self::TokenMalformed
            | Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::Internal => 500,
        }
    }
}

impl AuthError {
    /// Create an invalid argument error with the given reason.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a malformed token error with the given reason.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Create an expired token error from a unix timestamp.
    #[must_use]
    pub fn expired_at(exp: i64) -> Self {
        Self::TokenExpired {
            expired_at: DateTime::from_timestamp(exp, 0).unwrap_or_default(),
        }
    }

    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::InvalidToken => ErrorCode::TokenInvalid,
            Self::TokenExpired { .. } => ErrorCode::TokenExpired,
            Self::MalformedToken { .. } => ErrorCode::TokenMalformed,
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Authentication failures are terminal; retry belongs to the caller's login flow.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// True when the client should silently re-authenticate instead of showing an error.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::TokenExpired { .. })
    }

    /// Message safe to return to a client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidArgument { reason } => reason.clone(),
            Self::InvalidToken => "Token signature is invalid".to_string(),
            Self::TokenExpired { .. } => "Token has expired".to_string(),
            Self::MalformedToken { .. } => "Token is malformed".to_string(),
            Self::Unauthenticated => "Authentication required".to_string(),
            Self::Forbidden { .. } => "Insufficient role".to_string(),
            Self::Internal(_) => "Internal error".to_string(),
        }
    }
}
