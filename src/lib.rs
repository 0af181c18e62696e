//! # Tallyboard
//!
//! **Tallyboard** is a coroutine-powered web application for keeping drink tallies at a
//! party, office, or bar night. Participants join with a name, get a signed session
//! cookie, and bump a personal counter; everyone's standings show up on a live
//! leaderboard.
//!
//! ## Overview
//!
//! Tallyboard is a complete self-contained service built on the `may` coroutine runtime.
//! It serves three HTML pages (join form, personal counter, leaderboard), a small JSON
//! API used by the pages, and persists counts either to a JSON document on disk or to
//! process memory.
//!
//! ## Architecture
//!
//! The crate is organized into several key modules:
//!
//! - **[`router`]** - Method + path matching over a fixed route table
//! - **[`dispatcher`]** - Coroutine-based request handler dispatch
//! - **[`server`]** - HTTP server built on `may_minihttp` with request/response types
//! - **[`middleware`]** - Pluggable middleware (metrics, tracing)
//! - **[`handlers`]** - One handler per route: join, counter, increment, decrement, ...
//! - **[`session`]** - Signed, stateless session cookies
//! - **[`store`]** - Count persistence behind the [`store::ParticipantStore`] trait
//! - **[`static_files`]** - Static assets and MiniJinja page templates
//! - **[`cli`]** - `serve` and `standings` commands
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant Router as Router
//!     participant Dispatcher as Dispatcher
//!     participant Handler as Handler<br/>(Coroutine)
//!     participant Store as ParticipantStore
//!
//!     Client->>Server: POST /increment<br/>Cookie: tally_session=...
//!     Server->>Server: Parse HTTP<br/>(headers, cookies, body)
//!     Server->>Router: route(POST, "/increment")
//!
//!     alt No Route Match
//!         Router-->>Client: 404 Not Found<br/>(or static asset for GET)
//!     end
//!
//!     Router-->>Server: RouteMatch<br/>(handler: "increment")
//!     Server->>Dispatcher: dispatch(route_match, body, ...)
//!     Dispatcher->>Dispatcher: Middleware before()
//!     Dispatcher->>Handler: Send via channel<br/>(HandlerRequest)
//!
//!     Note over Handler: Handler runs in<br/>may coroutine
//!     Handler->>Handler: Verify session cookie
//!
//!     alt No Valid Session
//!         Handler-->>Client: 401 {"error": "Not logged in"}
//!     end
//!
//!     Handler->>Store: increment(name)
//!     Store-->>Handler: new count
//!
//!     alt Handler Panics
//!         Handler-->>Dispatcher: Panic caught
//!         Dispatcher-->>Client: 500 Internal Server Error
//!     end
//!
//!     Handler-->>Dispatcher: HandlerResponse<br/>(status, headers, body)
//!     Dispatcher->>Dispatcher: Middleware after()<br/>(metrics, access log)
//!     Dispatcher-->>Server: Response
//!     Server-->>Client: 200 {"success": true, "count": 3}
//! ```
//!
//! ### Key Architectural Patterns
//!
//! 1. **Coroutine-Based Concurrency**: Each handler runs in a lightweight `may` coroutine
//! 2. **Channel Communication**: Requests routed to handlers via MPSC channels
//! 3. **Stateless Sessions**: Identity lives in a signed cookie, never on the server
//! 4. **Swappable Persistence**: One [`store::ParticipantStore`] trait, two backends
//! 5. **Middleware Chain**: Request/response processing through composable middleware
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, RwLock};
//! use tallyboard::dispatcher::Dispatcher;
//! use tallyboard::router::Router;
//! use tallyboard::server::{AppService, HttpServer};
//! use tallyboard::session::SessionManager;
//! use tallyboard::state::AppState;
//! use tallyboard::store::MemoryStore;
//!
//! let state = AppState::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SessionManager::new()),
//!     "templates",
//! );
//!
//! let mut dispatcher = Dispatcher::new();
//! unsafe { tallyboard::registry::register_all(&mut dispatcher, &state) };
//!
//! let router = Arc::new(RwLock::new(Router::new(tallyboard::registry::routes())));
//! let service = AppService::new(router, Arc::new(RwLock::new(dispatcher)), None);
//!
//! let handle = HttpServer(service).start("0.0.0.0:5001").unwrap();
//! handle.join().unwrap();
//! ```
//!
//! Or just run the binary:
//!
//! ```bash
//! tallyboard serve --addr 0.0.0.0:5001 --store json --data-file data.json
//! ```
//!
//! ## Runtime Considerations
//!
//! Tallyboard uses the `may` coroutine runtime, not tokio or async-std. This means:
//!
//! - All handlers run in coroutines (lightweight threads)
//! - Stack size is configurable via the `TALLY_STACK_SIZE` environment variable
//! - The runtime is incompatible with tokio-based libraries without bridging
//! - Blocking operations should use `may`'s blocking facilities
//!
//! ## Example API Calls
//!
//! ```bash
//! # Join (sets the session cookie, redirects to /counter)
//! curl -i -X POST -d 'name=alice' http://localhost:5001/join
//!
//! # Bump your counter
//! curl -X POST -b 'tally_session=...' http://localhost:5001/increment
//!
//! # Current standings, best first
//! curl http://localhost:5001/api/participants
//!
//! # Health check and metrics
//! curl http://localhost:5001/health
//! curl http://localhost:5001/metrics
//! ```

pub mod cli;

pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod state;
pub mod static_files;
pub mod store;

pub use session::{SessionManager, SESSION_COOKIE};
pub use state::AppState;
pub use store::{CountMap, JsonFileStore, MemoryStore, Participant, ParticipantStore};
