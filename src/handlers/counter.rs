use serde_json::json;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::state::AppState;

/// `GET /counter`: the personal tally page.
///
/// Without a bound session this redirects to the entry page rather than
/// answering 401: it is a browser-facing route.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let response = match state.sessions.current_name(&req.cookies) {
        Some(name) => {
            let count = state.store.get_count(&name);
            super::page(state, "counter.html", &json!({ "name": name, "count": count }))
        }
        None => HandlerResponse::redirect("/"),
    };
    let _ = req.reply_tx.send(response);
}
