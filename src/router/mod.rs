//! # Router Module
//!
//! Matches incoming requests to named handlers. The route table is small and
//! fully static (no path parameters anywhere in the app), so matching is an
//! exact comparison on `(method, path)` over a linear scan with no pattern
//! compilation and no per-request allocation.
//!
//! Query parameters are not part of matching; the service extracts them
//! separately and attaches them to the [`RouteMatch`] before dispatch.

mod core;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
