use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use wahlomat_core::party::Party;
use wahlomat_core::session::Session;

/// In-memory registry of live sessions, keyed by session ID.
///
/// Each connected client owns exactly one entry. The per-session `Mutex` serializes the
/// actions of that client; different sessions never share state.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl SessionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a session for a new client and returns its handle.
    ///
    /// # Arguments
    ///
    /// * `default_party` - Party preselected for the new session
    pub async fn create(&self, default_party: Party) -> (String, Arc<Mutex<Session>>) {
        let session = Session::new(default_party);
        let session_id = session.id().to_string();
        let created_at = session.created_at().to_string();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), handle.clone());

        tracing::info!(
            "[SessionRegistry] Created session {} at {}",
            session_id,
            created_at
        );
        (session_id, handle)
    }

    /// Gets a session by ID.
    ///
    /// # Returns
    ///
    /// `Some(handle)` if the session is registered, `None` otherwise.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Removes a session when its client disconnects.
    ///
    /// # Returns
    ///
    /// `true` if a session was removed.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).is_some();
        if removed {
            tracing::info!("[SessionRegistry] Removed session {}", session_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
