use std::sync::Arc;
use warden_core::CredentialStore;
use warden_token::SessionManager;

/// Shared application state.
pub struct AppState {
    pub sessions: SessionManager,
    pub users: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(sessions: SessionManager, users: Arc<dyn CredentialStore>) -> Self {
        Self { sessions, users }
    }
}
