use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, ...)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Cookies from the Cookie header
    pub cookies: HeaderVec,
    /// Query string parameters
    pub query_params: ParamVec,
    /// Body decoded to JSON (JSON documents as-is, form posts as an object)
    pub body: Option<serde_json::Value>,
}

/// Split the Cookie header into name/value pairs.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    let mut cookies = HeaderVec::new();
    let Some((_, raw)) = headers.iter().find(|(k, _)| k.as_ref() == "cookie") else {
        return cookies;
    };
    for pair in raw.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let Some(name) = parts.next() else { continue };
        if name.is_empty() {
            continue;
        }
        let value = parts.next().unwrap_or("").trim().to_string();
        cookies.push((Arc::from(name.trim()), value));
    }
    cookies
}

/// Parse query string parameters from a URL path.
///
/// Extracts everything after `?` and percent-decodes names and values.
pub fn parse_query_params(path: &str) -> ParamVec {
    let mut params = ParamVec::new();
    if let Some(pos) = path.find('?') {
        let query_str = &path[pos + 1..];
        for (k, v) in url::form_urlencoded::parse(query_str.as_bytes()) {
            params.push((Arc::from(k.as_ref()), v.to_string()));
        }
    }
    params
}

/// Decode a request body according to its content type.
///
/// `application/json` parses as-is; `application/x-www-form-urlencoded`
/// becomes a JSON object of string fields so handlers read both shapes the
/// same way. Anything else (or an undecodable body) is `None`.
pub fn parse_body(content_type: &str, raw: &str) -> Option<serde_json::Value> {
    if raw.is_empty() {
        return None;
    }
    if content_type.contains("application/x-www-form-urlencoded") {
        let mut fields = serde_json::Map::new();
        for (k, v) in url::form_urlencoded::parse(raw.as_bytes()) {
            fields.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        return Some(serde_json::Value::Object(fields));
    }
    if content_type.contains("application/json") {
        return serde_json::from_str(raw).ok();
    }
    None
}

/// Extract everything `AppService` needs from a raw `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let mut headers = HeaderVec::new();
    for h in req.headers().iter() {
        headers.push((
            Arc::from(h.name.to_ascii_lowercase().as_str()),
            String::from_utf8_lossy(h.value).to_string(),
        ));
    }

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(size) if size > 0 => {
                let content_type = headers
                    .iter()
                    .find(|(k, _)| k.as_ref() == "content-type")
                    .map(|(_, v)| v.as_str())
                    .unwrap_or("");
                parse_body(content_type, &body_str)
            }
            _ => None,
        }
    };

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        cookie_count = cookies.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        body,
    }
}
