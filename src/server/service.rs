use super::request::{parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::{Dispatcher, HandlerResponse, HeaderVec};
use crate::middleware::MetricsMiddleware;
use crate::router::Router;
use crate::static_files::StaticFiles;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// The HTTP service: parse, route, dispatch, write.
///
/// Infrastructure endpoints (`/health`, `/metrics`) answer before routing;
/// unmatched GETs fall through to the static asset directory; everything
/// else is a JSON 404.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<RwLock<Router>>,
    pub dispatcher: Arc<RwLock<Dispatcher>>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
    pub static_files: Option<StaticFiles>,
}

impl AppService {
    pub fn new(
        router: Arc<RwLock<Router>>,
        dispatcher: Arc<RwLock<Dispatcher>>,
        static_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            metrics: None,
            static_files: static_dir.map(StaticFiles::new),
        }
    }

    /// Install the metrics middleware shared with the dispatcher so
    /// `/metrics` can read the counters.
    pub fn set_metrics_middleware(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_handler_response(res, HandlerResponse::json(200, json!({ "status": "ok" })));
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    let body = format!(
        "# HELP tallyboard_requests_total Total number of dispatched requests\n\
         # TYPE tallyboard_requests_total counter\n\
         tallyboard_requests_total {}\n\
         # HELP tallyboard_request_latency_seconds Average request latency in seconds\n\
         # TYPE tallyboard_request_latency_seconds gauge\n\
         tallyboard_request_latency_seconds {}\n\
         # HELP tallyboard_auth_failures_total Mutations rejected for missing sessions\n\
         # TYPE tallyboard_auth_failures_total counter\n\
         tallyboard_auth_failures_total {}\n\
         # HELP tallyboard_top_level_requests_total Requests answered outside dispatch\n\
         # TYPE tallyboard_top_level_requests_total counter\n\
         tallyboard_top_level_requests_total {}\n\
         # HELP tallyboard_coroutine_stack_bytes Configured coroutine stack size\n\
         # TYPE tallyboard_coroutine_stack_bytes gauge\n\
         tallyboard_coroutine_stack_bytes {}\n",
        metrics.request_count(),
        metrics.average_latency().as_secs_f64(),
        metrics.auth_failures(),
        metrics.top_level_request_count(),
        metrics.stack_size(),
    );
    write_handler_response(
        res,
        HandlerResponse::new(200, HeaderVec::new(), Value::String(body)),
    );
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            cookies,
            query_params,
            body,
        } = parse_request(req);

        if method == "GET" && path == "/health" {
            if let Some(metrics) = &self.metrics {
                metrics.inc_top_level_request();
            }
            return health_endpoint(res);
        }
        if method == "GET" && path == "/metrics" {
            return match &self.metrics {
                Some(metrics) => {
                    metrics.inc_top_level_request();
                    metrics_endpoint(res, metrics)
                }
                None => {
                    write_json_error(
                        res,
                        404,
                        json!({"error": "Not Found", "method": method, "path": path}),
                    );
                    Ok(())
                }
            };
        }

        let http_method: Method = match method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_json_error(res, 400, json!({"error": "Bad Request"}));
                return Ok(());
            }
        };

        let route_opt = {
            let router = self.router.read().unwrap();
            router.route(http_method, &path)
        };

        if let Some(mut route_match) = route_opt {
            route_match.query_params = query_params;
            let handler_response = {
                let dispatcher = self.dispatcher.read().unwrap();
                dispatcher.dispatch(route_match, body, headers, cookies)
            };
            match handler_response {
                Some(hr) => write_handler_response(res, hr),
                None => {
                    write_json_error(
                        res,
                        500,
                        json!({
                            "error": "Handler failed or not registered",
                            "method": method,
                            "path": path
                        }),
                    );
                }
            }
            return Ok(());
        }

        // Unmatched GETs may be static assets (stylesheet, scripts).
        if method == "GET" {
            if let Some(sf) = &self.static_files {
                let p = path.trim_start_matches('/');
                if !p.is_empty() {
                    if let Ok((bytes, ct)) = sf.load(p, None) {
                        if let Some(metrics) = &self.metrics {
                            metrics.inc_top_level_request();
                        }
                        res.status_code(200, "OK");
                        let header = format!("Content-Type: {ct}").into_boxed_str();
                        res.header(Box::leak(header));
                        res.body_vec(bytes);
                        return Ok(());
                    }
                }
            }
        }

        write_json_error(
            res,
            404,
            json!({"error": "Not Found", "method": method, "path": path}),
        );
        Ok(())
    }
}
