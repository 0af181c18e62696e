use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::Value;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        302 => "Found",
        303 => "See Other",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write a handler response to the wire.
///
/// Headers set by the handler are written as-is; a Content-Type is filled in
/// only when the handler did not set one (`text/plain` for string bodies,
/// `application/json` otherwise). A `Null` body writes as empty, which is the
/// shape redirects use.
pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    res.status_code(hr.status as usize, status_reason(hr.status));

    let has_content_type = hr
        .headers
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));

    for (name, value) in &hr.headers {
        // may_minihttp wants 'static header lines; leak the formatted line
        let line = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(line));
    }

    match hr.body {
        Value::Null => {
            res.body_vec(Vec::new());
        }
        Value::String(s) => {
            if !has_content_type {
                res.header("Content-Type: text/plain; charset=utf-8");
            }
            res.body_vec(s.into_bytes());
        }
        other => {
            if !has_content_type {
                res.header("Content-Type: application/json");
            }
            res.body_vec(serde_json::to_vec(&other).unwrap_or_default());
        }
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
