use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of query parameters before heap allocation.
/// The routes here take at most a couple of query params, so the inline
/// capacity covers every realistic request.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the request path.
///
/// Param names use `Arc<str>` because they repeat across requests and
/// `Arc::clone()` is an O(1) refcount bump; values are per-request `String`s.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Metadata for a single route in the table.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    /// HTTP method the route answers to
    pub method: Method,
    /// Exact request path (e.g. `/api/participants`)
    pub path: String,
    /// Name of the handler registered with the dispatcher
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path: &str, handler_name: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Result of successfully matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route metadata (Arc to keep clones cheap)
    pub route: Arc<RouteMeta>,
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// Query string parameters (populated by the server after matching)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a query parameter by name.
    ///
    /// Uses "last write wins" semantics for duplicate names
    /// (e.g. `?limit=10&limit=20` returns the last occurrence).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Router resolving `(method, path)` pairs to handlers.
///
/// All paths are literal, so the table is a plain vector scanned in order;
/// with seven routes that beats any tree or hash lookup and allocates
/// nothing per request.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Arc<RouteMeta>>,
}

impl Router {
    /// Build a router from a list of routes.
    pub fn new(routes: Vec<RouteMeta>) -> Self {
        let routes: Vec<Arc<RouteMeta>> = routes.into_iter().map(Arc::new).collect();
        debug!(route_count = routes.len(), "Router built");
        Self { routes }
    }

    /// Match a request against the table.
    ///
    /// Returns `None` when nothing matches; the caller decides whether that
    /// means a static file lookup or a 404. The returned match carries an
    /// empty `query_params`; the server fills it in from the parsed request.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let route = self
            .routes
            .iter()
            .find(|r| r.method == method && r.path == path)?;
        Some(RouteMatch {
            route: Arc::clone(route),
            handler_name: route.handler_name.clone(),
            query_params: ParamVec::new(),
        })
    }

    /// Number of routes in the table, for startup logging.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
