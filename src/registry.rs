//! Route table and handler registry.
//!
//! The single place that knows which paths exist and which handler answers
//! each one. Handlers are registered as closures over a clone of the shared
//! [`AppState`], one dedicated coroutine per handler.

use http::Method;

use crate::dispatcher::Dispatcher;
use crate::handlers;
use crate::router::RouteMeta;
use crate::state::AppState;

/// The application's route table.
pub fn routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::GET, "/", "index"),
        RouteMeta::new(Method::POST, "/join", "join"),
        RouteMeta::new(Method::GET, "/counter", "counter"),
        RouteMeta::new(Method::POST, "/increment", "increment"),
        RouteMeta::new(Method::POST, "/decrement", "decrement"),
        RouteMeta::new(Method::GET, "/leaderboard", "leaderboard"),
        RouteMeta::new(Method::GET, "/api/participants", "list_participants"),
    ]
}

/// Register every handler with the dispatcher.
///
/// # Safety
///
/// Calls [`Dispatcher::register_handler`], which spawns `may` coroutines;
/// the may runtime must be initialized (stack size configured) first.
pub unsafe fn register_all(dispatcher: &mut Dispatcher, state: &AppState) {
    let s = state.clone();
    dispatcher.register_handler("index", move |req| handlers::index::handle(&s, req));
    let s = state.clone();
    dispatcher.register_handler("join", move |req| handlers::join::handle(&s, req));
    let s = state.clone();
    dispatcher.register_handler("counter", move |req| handlers::counter::handle(&s, req));
    let s = state.clone();
    dispatcher.register_handler("increment", move |req| handlers::increment::handle(&s, req));
    let s = state.clone();
    dispatcher.register_handler("decrement", move |req| handlers::decrement::handle(&s, req));
    let s = state.clone();
    dispatcher.register_handler("leaderboard", move |req| {
        handlers::leaderboard::handle(&s, req)
    });
    let s = state.clone();
    dispatcher.register_handler("list_participants", move |req| {
        handlers::participants::handle(&s, req)
    });
}
