use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::middleware::Middleware;

/// Maximum inline headers/cookies before heap allocation.
/// Browser requests to this app stay well under 16 of either.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the request path.
///
/// Header names use `Arc<str>` because the same names repeat on every request
/// (content-type, cookie, host) and cloning them is an O(1) refcount bump;
/// values stay per-request `String`s.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine.
///
/// Carries everything extracted from the HTTP request plus the reply channel
/// the handler must answer on. Bodies arrive pre-parsed: JSON documents as-is,
/// form-urlencoded posts decoded into a JSON object of string fields.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for log correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST)
    pub method: Method,
    /// Request path
    pub path: String,
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// Query string parameters
    pub query_params: ParamVec,
    /// HTTP headers, names lowercased
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Request body parsed as JSON (if present and decodable)
    pub body: Option<Value>,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a query parameter by name, last write wins for duplicates.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a form field from a decoded `application/x-www-form-urlencoded`
    /// body (also works for JSON bodies with string fields).
    #[inline]
    #[must_use]
    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name)?.as_str()
    }
}

/// Response data sent back from a handler coroutine.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 303, 401, ...)
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body; `String` renders as text/HTML, anything else as JSON,
    /// `Null` as an empty body
    pub body: Value,
}

impl HandlerResponse {
    /// Create a response with explicit status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON error response with shape `{"error": message}`.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Create an HTML page response.
    #[must_use]
    pub fn html(status: u16, html: String) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/html; charset=utf-8".to_string(),
        ));
        Self {
            status,
            headers,
            body: Value::String(html),
        }
    }

    /// 302 Found redirect, used when a GET arrives without a session.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("location"), location.to_string()));
        Self {
            status: 302,
            headers,
            body: Value::Null,
        }
    }

    /// 303 See Other redirect, used to answer form POSTs so the browser
    /// follows up with a GET.
    #[must_use]
    pub fn see_other(location: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("location"), location.to_string()));
        Self {
            status: 303,
            headers,
            body: Value::Null,
        }
    }

    /// Get a header by name.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Channel sender that delivers requests to a handler coroutine.
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Dispatcher routing matched requests to registered handler coroutines.
///
/// Holds the handler-name-to-channel registry and the ordered middleware
/// chain applied around every dispatch.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Map of handler names to their channel senders
    pub handlers: HashMap<String, HandlerSender>,
    /// Ordered list of middleware applied to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create an empty dispatcher; handlers are added with
    /// [`register_handler`](Self::register_handler).
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
        }
    }

    /// Add middleware to the pipeline. Middleware runs in insertion order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Register a handler function under the given name.
    ///
    /// Spawns a dedicated coroutine that drains the handler's channel, with
    /// panic recovery so one failing request cannot take the handler down.
    /// Registering a name twice replaces the old handler; dropping its sender
    /// closes the channel and the old coroutine exits.
    ///
    /// # Safety
    ///
    /// Marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure:
    /// - the may runtime is initialized (stack size configured) before this
    ///   is called
    /// - the handler sends exactly one response on `reply_tx` per request
    ///
    /// Panics inside the handler are caught and converted into 500 responses.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let name = name.to_string();
        let coroutine_name = name.clone();
        let stack_size = may::config().get_stack_size();

        // SAFETY: spawn() is unsafe per the may runtime; the closure is
        // Send + 'static and errors travel over the reply channel, never as
        // panics out of the coroutine.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %coroutine_name,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );

                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let handler_name = req.handler_name.clone();
                        let request_id = req.request_id;

                        let execution_start = Instant::now();

                        if let Err(panic) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                handler_fn(req);
                            }))
                        {
                            let panic_message = format!("{panic:?}");
                            error!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                panic_message = %panic_message,
                                "Handler panicked"
                            );
                            let _ = reply_tx.send(HandlerResponse::error(
                                500,
                                &format!("Handler panicked: {panic_message}"),
                            ));
                        } else {
                            debug!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                execution_time_ms = execution_start.elapsed().as_millis() as u64,
                                "Handler execution complete"
                            );
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.insert(name.clone(), tx).is_some() {
            warn!(
                handler_name = %name,
                "Replaced existing handler - old coroutine will exit"
            );
        }
    }

    /// Dispatch a request to its handler and wait for the response.
    ///
    /// Returns `None` when no handler is registered under the matched name.
    /// A registered handler whose channel has closed (crashed coroutine)
    /// yields a 503 instead, so the client gets a response rather than a
    /// dropped connection.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        body: Option<Value>,
        headers: HeaderVec,
        cookies: HeaderVec,
    ) -> Option<HandlerResponse> {
        let request_id = RequestId::new();
        let (reply_tx, reply_rx) = mpsc::channel();

        let tx = match self.handlers.get(&route_match.handler_name) {
            Some(tx) => tx,
            None => {
                error!(
                    handler_name = %route_match.handler_name,
                    available_handlers = ?self.handlers.keys().collect::<Vec<_>>(),
                    "Handler not found"
                );
                return None;
            }
        };

        let request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path: route_match.route.path.clone(),
            handler_name: route_match.handler_name,
            query_params: route_match.query_params,
            headers,
            cookies,
            body,
            reply_tx,
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(&request);
                if early_resp.is_some() {
                    debug!(
                        request_id = %request_id,
                        middleware_idx = idx,
                        "Middleware returned early response"
                    );
                }
            } else {
                mw.before(&request);
            }
        }

        // The after() view carries a stub reply sender. The live sender moves
        // to the handler with the request, so the reply channel closes if the
        // handler drops the request without answering.
        let (stub_tx, _stub_rx) = mpsc::channel();
        let mut after_req = request.clone();
        after_req.reply_tx = stub_tx;

        let (mut resp, latency) = if let Some(r) = early_resp {
            (r, Duration::from_millis(0))
        } else {
            debug!(
                request_id = %request_id,
                handler_name = %request.handler_name,
                method = %request.method,
                path = %request.path,
                "Request dispatched to handler"
            );

            let start = Instant::now();

            if let Err(e) = tx.send(request) {
                error!(
                    request_id = %request_id,
                    handler_name = %after_req.handler_name,
                    error = %e,
                    "Failed to send request to handler"
                );
                return None;
            }

            // may::sync::mpsc has no recv_timeout; handler-side panic
            // recovery guarantees a reply or a closed channel.
            let r = match reply_rx.recv() {
                Ok(response) => {
                    info!(
                        request_id = %request_id,
                        handler_name = %after_req.handler_name,
                        latency_ms = start.elapsed().as_millis() as u64,
                        status = response.status,
                        "Handler response received"
                    );
                    response
                }
                Err(e) => {
                    error!(
                        request_id = %request_id,
                        handler_name = %after_req.handler_name,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Handler channel closed - handler may have crashed"
                    );
                    return Some(HandlerResponse::error(
                        503,
                        &format!("Handler '{}' is not responding", after_req.handler_name),
                    ));
                }
            };
            (r, start.elapsed())
        };

        for mw in &self.middlewares {
            mw.after(&after_req, &mut resp, latency);
        }

        Some(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_helpers() {
        let ok = HandlerResponse::json(200, json!({"success": true, "count": 3}));
        assert_eq!(ok.status, 200);
        assert_eq!(ok.get_header("Content-Type"), Some("application/json"));

        let err = HandlerResponse::error(401, "Not logged in");
        assert_eq!(err.status, 401);
        assert_eq!(err.body, json!({"error": "Not logged in"}));

        let page = HandlerResponse::html(200, "<h1>hi</h1>".to_string());
        assert_eq!(page.get_header("content-type"), Some("text/html; charset=utf-8"));

        let seen = HandlerResponse::see_other("/counter");
        assert_eq!(seen.status, 303);
        assert_eq!(seen.get_header("Location"), Some("/counter"));
        assert_eq!(seen.body, Value::Null);

        let back = HandlerResponse::redirect("/");
        assert_eq!(back.status, 302);
        assert_eq!(back.get_header("location"), Some("/"));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = HandlerResponse::json(200, json!({}));
        res.set_header("Content-Type", "text/plain".to_string());
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
        assert_eq!(
            res.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn test_form_field_reads_decoded_body() {
        let (reply_tx, _reply_rx) = mpsc::channel();
        let req = HandlerRequest {
            request_id: RequestId::new(),
            method: Method::POST,
            path: "/join".to_string(),
            handler_name: "join".to_string(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: Some(json!({"name": "  alice  "})),
            reply_tx,
        };
        assert_eq!(req.form_field("name"), Some("  alice  "));
        assert_eq!(req.form_field("missing"), None);
    }
}
