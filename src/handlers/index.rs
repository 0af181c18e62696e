use serde_json::json;

use crate::dispatcher::HandlerRequest;
use crate::state::AppState;

/// `GET /`: the name entry page.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let response = super::page(state, "index.html", &json!({}));
    let _ = req.reply_tx.send(response);
}
