//! Role Guard Tower Layer
//!
//! Wraps a service (or a whole group of routes) with a [`RoleGuard`].
//! Layers stack: a request must pass every guard it travels through, and a
//! rejected request never reaches the inner service.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{ready, Either, Ready};
use tower::{Layer, Service};

use crate::error::AuthError;
use crate::guard::policy::RoleGuard;
use crate::identity::AuthenticatedIdentity;

/// Requests that may carry a verified identity.
pub trait IdentityCarrier {
    /// The identity established for this request, if any.
    fn identity(&self) -> Option<&AuthenticatedIdentity>;
}

/// Role guard layer for Tower
#[derive(Debug, Clone)]
pub struct RoleGuardLayer {
    guard: Arc<RoleGuard>,
}

impl RoleGuardLayer {
    /// Creates a new layer enforcing `guard`
    pub fn new(guard: RoleGuard) -> Self {
        Self {
            guard: Arc::new(guard),
        }
    }
}

impl<S> Layer<S> for RoleGuardLayer {
    type Service = RoleGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleGuardService {
            inner,
            guard: Arc::clone(&self.guard),
        }
    }
}

/// Role guard service wrapper
#[derive(Debug)]
pub struct RoleGuardService<S> {
    inner: S,
    guard: Arc<RoleGuard>,
}

impl<S: Clone> Clone for RoleGuardService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<S, Req> Service<Req> for RoleGuardService<S>
where
    S: Service<Req>,
    S::Error: From<AuthError>,
    Req: IdentityCarrier,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<S::Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let verdict = self.guard.check(req.identity()).map(|_| ());
        match verdict {
            Ok(()) => Either::Right(self.inner.call(req)),
            Err(e) => Either::Left(ready(Err(e.into()))),
        }
    }
}
