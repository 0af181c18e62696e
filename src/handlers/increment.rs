use serde_json::json;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::state::AppState;

/// `POST /increment`: add one drink for the session's participant.
///
/// No session means 401 with a JSON error and, importantly, no participant
/// entry springing into existence.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let response = match state.sessions.current_name(&req.cookies) {
        Some(name) => {
            let count = state.store.increment(&name);
            HandlerResponse::json(200, json!({ "success": true, "count": count }))
        }
        None => HandlerResponse::error(401, "Not logged in"),
    };
    let _ = req.reply_tx.send(response);
}
