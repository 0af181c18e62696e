#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tallyboard::dispatcher::Dispatcher;
use tallyboard::middleware::{MetricsMiddleware, TracingMiddleware};
use tallyboard::registry;
use tallyboard::router::Router;
use tallyboard::server::{AppService, HttpServer, ServerHandle};
use tallyboard::session::SessionManager;
use tallyboard::state::AppState;
use tallyboard::store::{JsonFileStore, MemoryStore, ParticipantStore};
use tallyboard::SESSION_COOKIE;

/// Fixed signing secret so tests can mint and inspect session cookies.
pub const TEST_SECRET: &str = "tallyboard-test-secret";

/// Test fixture with automatic setup and teardown using RAII.
///
/// Spins up the complete application (router, dispatcher, middleware,
/// static files) on a random port. `Drop` stops the server so tests clean
/// up even when they panic.
pub struct TestApp {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
    pub sessions: Arc<SessionManager>,
}

impl TestApp {
    pub fn with_memory_store() -> Self {
        Self::start(Arc::new(MemoryStore::new()))
    }

    pub fn with_json_store(path: impl Into<PathBuf>) -> Self {
        Self::start(Arc::new(JsonFileStore::new(path.into())))
    }

    /// Start a server around the given store. Tests that need to seed or
    /// inspect counts directly keep their own clone of the `Arc`.
    pub fn start(store: Arc<dyn ParticipantStore>) -> Self {
        may::config().set_stack_size(0x8000);

        let sessions = Arc::new(SessionManager::with_secret(TEST_SECRET));
        let state = AppState::new(store, sessions.clone(), "templates");

        let router = Arc::new(RwLock::new(Router::new(registry::routes())));
        let mut dispatcher = Dispatcher::new();
        let metrics = Arc::new(MetricsMiddleware::new());
        dispatcher.add_middleware(metrics.clone());
        dispatcher.add_middleware(Arc::new(TracingMiddleware));
        unsafe {
            registry::register_all(&mut dispatcher, &state);
        }

        let mut service = AppService::new(
            router,
            Arc::new(RwLock::new(dispatcher)),
            Some(PathBuf::from("static_site")),
        );
        service.set_metrics_middleware(metrics);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let handle = HttpServer(service).start(addr).unwrap();
        handle.wait_ready().unwrap();

        Self {
            handle: Some(handle),
            addr,
            sessions,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// A valid `Cookie` header value for `name`, as a browser would send it.
    pub fn session_cookie(&self, name: &str) -> String {
        format!("{}={}", SESSION_COOKIE, self.sessions.issue(name))
    }

    pub fn get(&self, path: &str) -> HttpResponse {
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        parse_response(&send_request(&self.addr, &req))
    }

    pub fn get_with_cookie(&self, path: &str, cookie: &str) -> HttpResponse {
        let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nCookie: {cookie}\r\n\r\n");
        parse_response(&send_request(&self.addr, &req))
    }

    /// POST a form body (`application/x-www-form-urlencoded`).
    pub fn post_form(&self, path: &str, form: &str) -> HttpResponse {
        let req = format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {}\r\n\r\n{form}",
            form.len()
        );
        parse_response(&send_request(&self.addr, &req))
    }

    /// POST with no body, optionally presenting a session cookie.
    pub fn post(&self, path: &str, cookie: Option<&str>) -> HttpResponse {
        let mut req = format!("POST {path} HTTP/1.1\r\nHost: localhost\r\n");
        if let Some(cookie) = cookie {
            req.push_str(&format!("Cookie: {cookie}\r\n"));
        }
        req.push_str("Content-Length: 0\r\n\r\n");
        parse_response(&send_request(&self.addr, &req))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

/// A parsed HTTP response: status line, headers, body.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_default()
    }

    /// Extract the session token from a `Set-Cookie` header, if present.
    pub fn session_token(&self) -> Option<String> {
        let cookie = self.header("set-cookie")?;
        let pair = cookie.split(';').next()?;
        let (name, token) = pair.split_once('=')?;
        (name == SESSION_COOKIE).then(|| token.to_string())
    }
}

pub fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {:?}", e),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

pub fn parse_response(resp: &str) -> HttpResponse {
    let mut parts = resp.split("\r\n\r\n");
    let head = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("").to_string();
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let headers = lines
        .filter_map(|l| {
            l.split_once(':')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        })
        .collect();
    HttpResponse {
        status,
        headers,
        body,
    }
}
