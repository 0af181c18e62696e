use serde_json::json;

use crate::dispatcher::HandlerRequest;
use crate::state::AppState;

/// `GET /leaderboard`: the standings page.
///
/// The page itself is static; rows come from `/api/participants` client-side
/// so the board refreshes without reloading.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let response = super::page(state, "leaderboard.html", &json!({}));
    let _ = req.reply_tx.send(response);
}
