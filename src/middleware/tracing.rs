use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Access-log middleware.
///
/// Emits one structured event per request on completion with the request id,
/// route, status, and latency. Spans don't survive the channel hop to the
/// handler coroutine, so this stays event-based.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            "Request accepted"
        );
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "Request completed"
        );
    }
}
