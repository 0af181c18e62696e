//! # Dispatcher Module
//!
//! Coroutine-based handler dispatch. Every handler runs on its own dedicated
//! `may` coroutine consuming an MPSC channel; the dispatcher sends a
//! [`HandlerRequest`] down that channel and blocks on a per-request reply
//! channel for the [`HandlerResponse`].
//!
//! ## Request flow
//!
//! 1. The router matches the request to a handler name.
//! 2. The dispatcher builds a `HandlerRequest` (request id, headers, cookies,
//!    query params, parsed body) and runs each middleware's `before` hook.
//! 3. The request goes over the handler's channel; the handler sends exactly
//!    one response back on `reply_tx`.
//! 4. Middleware `after` hooks observe the response and latency.
//!
//! ## Error handling
//!
//! - Handler panics are caught and become 500 responses; the coroutine keeps
//!   serving subsequent requests.
//! - A closed handler channel (crashed coroutine) becomes a 503.
//! - A handler name with no registration returns `None` and the service
//!   answers 500.
//!
//! One coroutine per handler also means each handler processes its requests
//! in arrival order, which keeps per-name counter updates sequential without
//! extra coordination.

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, MAX_INLINE_HEADERS,
};
