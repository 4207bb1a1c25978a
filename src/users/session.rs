//! In-memory login sessions

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::UserPublic;

/// An issued session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserPublic,
    pub expires_at: DateTime<Utc>,
}

/// Opaque bearer tokens mapped to the user who logged in
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user`
    pub fn issue(&self, user: UserPublic) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// The user behind a live token
    pub fn resolve(&self, token: &str) -> Option<UserPublic> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(token) {
                Some(session) if session.expires_at > now => return Some(session.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired
        self.revoke(token);
        None
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}
