use serde_json::json;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::state::AppState;

/// `GET /api/participants`: the leaderboard data, count descending.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let rows = state.store.list_sorted();
    let body = serde_json::to_value(&rows).unwrap_or_else(|_| json!([]));
    let _ = req.reply_tx.send(HandlerResponse::json(200, body));
}
