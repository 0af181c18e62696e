//! Middleware applied around handler dispatch.
//!
//! Middleware runs inside the dispatcher: `before` may short-circuit with an
//! early response, `after` observes the final response and latency. Both
//! implementations here are passive observers (metrics and access logging);
//! session gating happens in the handlers themselves because half the routes
//! are public.

mod core;
mod metrics;
mod tracing;

pub use core::Middleware;
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
