//! In-memory session store with lazy expiry.
//!
//! The store owns every [`Session`]; handlers and the relay reach session
//! state only through it. Removal of idle sessions is lazy: callers invoke
//! [`SessionStore::sweep_expired`] at the start of each request rather than
//! running a background timer.
//!
//! Every operation completes without suspension, so requests multiplexed on
//! the async runtime never observe a half-applied store mutation and no
//! explicit locking is needed beyond the sharded map.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use tickety_types::chat::Session;
use tickety_types::llm::{Message, MessageRole};

/// Inactivity window after which a session becomes eligible for removal.
pub const SESSION_EXPIRY_MINUTES: i64 = 30;

/// In-memory mapping of session id to session state.
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    system_prompt: Arc<str>,
    expiry: TimeDelta,
}

impl SessionStore {
    /// Create a store with the default 30-minute expiry window.
    pub fn new(system_prompt: &str) -> Self {
        Self::with_expiry(system_prompt, TimeDelta::minutes(SESSION_EXPIRY_MINUTES))
    }

    /// Create a store with an explicit expiry window.
    pub fn with_expiry(system_prompt: &str, expiry: TimeDelta) -> Self {
        Self {
            sessions: DashMap::new(),
            system_prompt: Arc::from(system_prompt),
            expiry,
        }
    }

    /// Return the id of a live session, creating one when the caller holds
    /// no id, an unknown id, or an id whose session has gone stale.
    ///
    /// A stale entry is never reused: the caller gets a fresh id and a
    /// fresh transcript seeded with the system instruction, and the stale
    /// entry is left for the next sweep.
    pub fn resolve(&self, requested: Option<Uuid>) -> Uuid {
        if let Some(id) = requested {
            if let Some(session) = self.sessions.get(&id) {
                if Utc::now() - session.last_active_at <= self.expiry {
                    return id;
                }
            }
        }

        let id = Uuid::now_v7();
        self.sessions.insert(id, Session::new(id, &self.system_prompt));
        tracing::debug!(%id, "created session");
        id
    }

    /// Remove every session idle past the expiry window.
    ///
    /// Returns the number of sessions removed. Calling it again with no
    /// elapsed time removes nothing.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let now = Utc::now();
        self.sessions
            .retain(|_, session| now - session.last_active_at <= self.expiry);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "swept expired sessions");
        }
        removed
    }

    /// Append a message to a session's transcript and refresh its activity
    /// timestamp. Returns false when the session no longer exists.
    pub fn append(&self, id: &Uuid, role: MessageRole, content: impl Into<String>) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.push(role, content);
                true
            }
            None => false,
        }
    }

    /// Snapshot a session's transcript in conversation order.
    pub fn transcript(&self, id: &Uuid) -> Option<Vec<Message>> {
        self.sessions.get(id).map(|session| session.transcript.clone())
    }

    /// Number of sessions currently held, live or awaiting sweep.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "You are a booking assistant.";

    fn backdate(store: &SessionStore, id: &Uuid, minutes: i64) {
        store.sessions.get_mut(id).unwrap().last_active_at =
            Utc::now() - TimeDelta::minutes(minutes);
    }

    #[test]
    fn test_resolve_without_id_creates_seeded_session() {
        let store = SessionStore::new(PROMPT);
        let id = store.resolve(None);

        let transcript = store.transcript(&id).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, MessageRole::System);
        assert_eq!(transcript[0].content, PROMPT);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_reuses_live_session() {
        let store = SessionStore::new(PROMPT);
        let id = store.resolve(None);
        store.append(&id, MessageRole::User, "Book a movie ticket");

        let again = store.resolve(Some(id));
        assert_eq!(again, id);
        assert_eq!(store.transcript(&id).unwrap().len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_id_creates_new_session() {
        let store = SessionStore::new(PROMPT);
        let unknown = Uuid::now_v7();

        let id = store.resolve(Some(unknown));
        assert_ne!(id, unknown);
        assert_eq!(store.transcript(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_expired_id_yields_fresh_session() {
        let store = SessionStore::new(PROMPT);
        let stale = store.resolve(None);
        store.append(&stale, MessageRole::User, "Book a movie ticket");
        backdate(&store, &stale, 31);

        let fresh = store.resolve(Some(stale));
        assert_ne!(fresh, stale);
        // Fresh transcript holds only the system message.
        assert_eq!(store.transcript(&fresh).unwrap().len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = SessionStore::new(PROMPT);
        let stale = store.resolve(None);
        let live = store.resolve(None);
        backdate(&store, &stale, 31);

        assert_eq!(store.sweep_expired(), 1);
        assert!(store.transcript(&stale).is_none());
        assert!(store.transcript(&live).is_some());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let store = SessionStore::new(PROMPT);
        let stale = store.resolve(None);
        backdate(&store, &stale, 31);

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.sweep_expired(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_inside_window_survives_sweep() {
        let store = SessionStore::with_expiry(PROMPT, TimeDelta::minutes(30));
        let id = store.resolve(None);
        backdate(&store, &id, 29);

        assert_eq!(store.sweep_expired(), 0);
        assert!(store.transcript(&id).is_some());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(PROMPT);
        let a = store.resolve(None);
        let b = store.resolve(None);

        store.append(&a, MessageRole::User, "2 tickets please");

        assert_eq!(store.transcript(&a).unwrap().len(), 2);
        assert_eq!(store.transcript(&b).unwrap().len(), 1);
    }

    #[test]
    fn test_append_to_missing_session_returns_false() {
        let store = SessionStore::new(PROMPT);
        assert!(!store.append(&Uuid::now_v7(), MessageRole::User, "hello"));
    }

    #[test]
    fn test_append_refreshes_activity() {
        let store = SessionStore::new(PROMPT);
        let id = store.resolve(None);
        backdate(&store, &id, 29);

        store.append(&id, MessageRole::User, "still here");

        // The append pushed the session back inside the window.
        assert_eq!(store.sweep_expired(), 0);
    }
}
