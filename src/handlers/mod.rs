//! One handler per route.
//!
//! Handlers follow the raw dispatch shape: take the shared [`AppState`] and
//! the [`HandlerRequest`], build a [`HandlerResponse`], and send exactly one
//! reply on `req.reply_tx`. Session gating lives here, per route, because
//! the page routes redirect while the mutation routes answer 401 JSON.

pub mod counter;
pub mod decrement;
pub mod increment;
pub mod index;
pub mod join;
pub mod leaderboard;
pub mod participants;

use serde_json::Value;
use tracing::error;

use crate::dispatcher::HandlerResponse;
use crate::state::AppState;

/// Render a template to an HTML response; render failures become 500s.
pub(crate) fn page(state: &AppState, template: &str, ctx: &Value) -> HandlerResponse {
    match state.templates.render(template, ctx) {
        Ok(html) => HandlerResponse::html(200, html),
        Err(e) => {
            error!(template = %template, error = %e, "Template render failed");
            HandlerResponse::error(500, "Template error")
        }
    }
}
