use std::path::PathBuf;
use std::sync::Arc;

use crate::session::SessionManager;
use crate::static_files::StaticFiles;
use crate::store::ParticipantStore;

/// Process-scoped application state handed to every handler.
///
/// Built once at startup and cloned into the handler closures; nothing in
/// the app is reachable through a global.
#[derive(Clone)]
pub struct AppState {
    /// Count storage (json file or in-memory, chosen at startup)
    pub store: Arc<dyn ParticipantStore>,
    /// Session cookie signer/verifier
    pub sessions: Arc<SessionManager>,
    /// Page templates rendered per request
    pub templates: StaticFiles,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        sessions: Arc<SessionManager>,
        template_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            sessions,
            templates: StaticFiles::new(template_dir),
        }
    }
}
