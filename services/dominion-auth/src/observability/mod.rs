//! Observability Module
//!
//! Structured logging setup and Prometheus counters for the auth core.

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, LogFormat, TracingConfig};
