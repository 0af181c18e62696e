use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook points around handler execution.
///
/// `before` returning `Some` short-circuits dispatch and the response is
/// returned without reaching the handler; `after` runs for every response,
/// early or not.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
