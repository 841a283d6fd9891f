use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::{ChatBackend, SessionState};

struct SessionData {
    state: Arc<Mutex<SessionState>>,
    last_activity: Instant,
}

/// In-process session registry with last-activity tracking and periodic
/// cleanup of idle sessions.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    cleanup_interval: Duration,
    session_timeout: Duration,
    chat_backend: Arc<dyn ChatBackend>,
}

impl SessionManager {
    pub fn new(chat_backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300), // 5 minutes
            session_timeout: Duration::from_secs(1800), // 30 minutes
            chat_backend,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timeouts(
        mut self,
        cleanup_interval: Duration,
        session_timeout: Duration,
    ) -> Self {
        self.cleanup_interval = cleanup_interval;
        self.session_timeout = session_timeout;
        self
    }

    pub async fn get_or_create_session(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.write().await;

        if let Some(session_data) = sessions.get_mut(session_id) {
            session_data.last_activity = Instant::now();
            return session_data.state.clone();
        }

        let session_data = SessionData {
            state: Arc::new(Mutex::new(SessionState::new(Arc::clone(&self.chat_backend)))),
            last_activity: Instant::now(),
        };
        let new_session = session_data.state.clone();
        sessions.insert(session_id.to_string(), session_data);
        println!("📝 Created new session: {}", session_id);
        new_session
    }

    /// Drops a session immediately. Returns whether it existed.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).is_some();
        if removed {
            println!("🗑️ Removed session: {}", session_id);
        }
        removed
    }

    pub async fn cleanup_inactive_sessions(&self) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        sessions.retain(|session_id, session_data| {
            let should_keep = now.duration_since(session_data.last_activity) < self.session_timeout;
            if !should_keep {
                println!("🗑️ Cleaning up inactive session: {}", session_id);
            }
            should_keep
        });
    }

    pub fn start_cleanup_task(self: Arc<Self>) {
        let cleanup_manager = Arc::clone(&self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_manager.cleanup_interval);
            loop {
                interval.tick().await;
                cleanup_manager.cleanup_inactive_sessions().await;
            }
        });
    }

    pub async fn get_active_session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
