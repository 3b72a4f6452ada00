//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use cnis_core::{AppConfig, Error, Result};
use cnis_history::{HistorySession, ProfileStore};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ProfileStore>,
    /// Sessions holding unsaved changes, keyed by client identity. A clean
    /// session is reopened from the store on its next access.
    pub sessions: RwLock<HashMap<String, HistorySession>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            config,
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Run `f` against the client's session, opening it from the store when
    /// it is not held. The session map stays write-locked for the call, and
    /// the session is kept afterwards only if it has unsaved changes.
    pub fn with_session<R>(
        &self,
        client_id: &str,
        f: impl FnOnce(&mut HistorySession) -> Result<R>,
    ) -> Result<R> {
        let mut sessions = self.sessions.write();
        let mut session = match sessions.remove(client_id) {
            Some(session) => session,
            None => {
                debug!("Opening session for {}", client_id);
                HistorySession::load(
                    client_id,
                    self.store.as_ref(),
                    self.config.heuristics.clone(),
                )?
            }
        };

        let result = f(&mut session);
        if session.has_unsaved_changes() {
            sessions.insert(client_id.to_string(), session);
        } else {
            debug!("Released clean session for {}", client_id);
        }
        result
    }

    /// Drop the client's session and saved history.
    pub fn forget_client(&self, client_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let had_session = sessions.remove(client_id).is_some();
        let had_history = self.store.delete_history(client_id)?;
        if !had_session && !had_history {
            return Err(Error::NotFound(format!("client {}", client_id)));
        }
        info!("Forgot history of {}", client_id);
        Ok(())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
