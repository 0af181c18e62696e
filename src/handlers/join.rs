use tracing::info;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::state::AppState;

/// `POST /join`: bind a session to the submitted name.
///
/// A name that is empty after trimming bounces back to the entry page with
/// no session and no participant. Otherwise the name is bound to a fresh
/// session cookie and the participant exists from here on, starting at 0.
pub fn handle(state: &AppState, req: HandlerRequest) {
    let name = req
        .form_field("name")
        .map(str::trim)
        .unwrap_or("")
        .to_string();

    let response = if name.is_empty() {
        HandlerResponse::see_other("/")
    } else {
        state.store.ensure_participant(&name);
        info!(name = %name, "Participant joined");
        let mut response = HandlerResponse::see_other("/counter");
        response.set_header("set-cookie", state.sessions.cookie_for(&name));
        response
    };

    let _ = req.reply_tx.send(response);
}
