use serde_json::json;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::state::AppState;

/// `POST /decrement`: take one drink back, never below zero.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let response = match state.sessions.current_name(&req.cookies) {
        Some(name) => {
            let count = state.store.decrement(&name);
            HandlerResponse::json(200, json!({ "success": true, "count": count }))
        }
        None => HandlerResponse::error(401, "Not logged in"),
    };
    let _ = req.reply_tx.send(response);
}
