//! Token issuance.
//!
//! Tokens are HS256 JWTs signed with the primary key. Nothing is persisted.

use jsonwebtoken::{encode, Algorithm, Header};
use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, DEFAULT_EXPIRY_MINUTES, DEFAULT_ISSUER};
use crate::error::AuthError;
use crate::jwt::claims::{distinct_roles, Claims};
use crate::jwt::keys::SigningKeyPair;
use crate::observability::metrics;

/// Everything a caller can put into a token.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    subject: String,
    roles: Vec<String>,
    email: Option<String>,
    display_name: Option<String>,
    expiry_minutes: Option<u32>,
}

impl IssueRequest {
    /// Request for `subject` holding `roles`, using the issuer's default lifetime.
    #[must_use]
    pub fn new<I, R>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds an `email` claim.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a `display_name` claim.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Overrides the issuer's default lifetime. Zero yields an already-expired token.
    #[must_use]
    pub const fn expiry_minutes(mut self, minutes: u32) -> Self {
        self.expiry_minutes = Some(minutes);
        self
    }

    fn validated_roles(&self) -> Result<Vec<String>, AuthError> {
        let roles = distinct_roles(self.roles.iter().map(String::as_str));
        if roles.is_empty() {
            return Err(AuthError::invalid_argument("at least one role is required"));
        }
        Ok(roles.into_iter().collect())
    }
}

/// Signs tokens with the primary key of a [`SigningKeyPair`].
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeyPair>,
    issuer: String,
    default_expiry_minutes: u32,
}

impl TokenIssuer {
    /// Issuer tagging tokens `codex-dominion` with a 60 minute default lifetime.
    #[must_use]
    pub fn new(keys: Arc<SigningKeyPair>) -> Self {
        Self {
            keys,
            issuer: DEFAULT_ISSUER.to_string(),
            default_expiry_minutes: DEFAULT_EXPIRY_MINUTES,
        }
    }

    /// Builds an issuer sharing `keys` with the verifier.
    #[must_use]
    pub fn from_config(config: &Config, keys: Arc<SigningKeyPair>) -> Self {
        Self::new(keys)
            .with_issuer(config.issuer.clone())
            .with_default_expiry_minutes(config.default_expiry_minutes)
    }

    /// Overrides the `iss` tag.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Overrides the lifetime used when a request does not set one.
    #[must_use]
    pub const fn with_default_expiry_minutes(mut self, minutes: u32) -> Self {
        self.default_expiry_minutes = minutes;
        self
    }

    /// Issues a token using the system clock.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the subject is blank or no non-blank role is given.
    pub fn issue_token(&self, request: IssueRequest) -> Result<String, AuthError> {
        self.issue_token_at(request, chrono::Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (seconds since epoch).
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the subject is blank or no non-blank role is given.
    pub fn issue_token_at(&self, request: IssueRequest, now: i64) -> Result<String, AuthError> {
        if request.subject.trim().is_empty() {
            return Err(AuthError::invalid_argument("subject must not be empty"));
        }
        let roles = request.validated_roles()?;
        let minutes = request.expiry_minutes.unwrap_or(self.default_expiry_minutes);

        let mut claims = Claims::new(
            self.issuer.clone(),
            request.subject.clone(),
            roles,
            now,
            i64::from(minutes) * 60,
        );
        if let Some(email) = request.email {
            claims = claims.with_email(email);
        }
        if let Some(display_name) = request.display_name {
            claims = claims.with_display_name(display_name);
        }

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding_key())
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("JWT encoding failed: {e}")))?;

        metrics::record_token_issued("HS256");
        debug!(
            subject = %request.subject,
            jti = claims.jti.as_deref().unwrap_or_default(),
            expiry_minutes = minutes,
            "Token issued"
        );

        Ok(token)
    }
}
