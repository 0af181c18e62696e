use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Middleware collecting the counters surfaced by `/metrics`.
///
/// All counters are atomics with `Relaxed` ordering: eventually consistent,
/// never a lock on the request path. This middleware is passive; it never
/// blocks or rewrites a request.
///
/// Tracked:
/// - total dispatched request count
/// - cumulative latency (for the average latency gauge)
/// - rejected mutations (401 responses from the session gate)
/// - top-level requests (`/health`, `/metrics`, static files) that bypass
///   dispatch; the service increments these directly
/// - configured coroutine stack size
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    auth_failures: AtomicUsize,
    top_level_requests: AtomicUsize,
    stack_size: AtomicUsize,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            auth_failures: AtomicUsize::new(0),
            top_level_requests: AtomicUsize::new(0),
            stack_size: AtomicUsize::new(0),
        }
    }
}

impl MetricsMiddleware {
    /// Create a metrics middleware with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of dispatched requests.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all dispatched requests; zero when no
    /// requests have been processed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Number of mutation attempts rejected with 401.
    pub fn auth_failures(&self) -> usize {
        self.auth_failures.load(Ordering::Relaxed)
    }

    /// Increment the counter for endpoints that bypass dispatch
    /// (`/health`, `/metrics`, static assets).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of requests that bypassed dispatch.
    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    /// Configured coroutine stack size observed at dispatch time.
    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if res.status == 401 {
            self.auth_failures.fetch_add(1, Ordering::Relaxed);
        }
        // Record the stack size actually in effect for the current coroutine
        // when available, otherwise the global configuration.
        if may::coroutine::is_coroutine() {
            let co = may::coroutine::current();
            self.stack_size.store(co.stack_size(), Ordering::Relaxed);
        } else {
            self.stack_size
                .store(may::config().get_stack_size(), Ordering::Relaxed);
        }
    }
}
