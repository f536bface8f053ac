//! Per-conversation session state
//!
//! Sessions are created on first use and evicted after a period of
//! inactivity. History is bounded; the oldest entries drop first.

use crate::core::config::AssistConfig;
use crate::core::types::SessionId;
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One handled command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntry {
    pub command: String,
    pub operation: String,
    pub message: String,
    pub change_count: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub history: VecDeque<SessionEntry>,
    last_seen: Instant,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            history: VecDeque::new(),
            last_seen: Instant::now(),
        }
    }

    /// Most recent commands, oldest first
    pub fn recent_commands(&self, limit: usize) -> Vec<String> {
        let skip = self.history.len().saturating_sub(limit);
        self.history
            .iter()
            .skip(skip)
            .map(|e| e.command.clone())
            .collect()
    }
}

/// Storage for session state, passed explicitly into the orchestrator
pub trait SessionStore: Send + Sync {
    /// Snapshot of the session, creating it if missing or expired
    fn get_or_create(&self, id: SessionId) -> Session;

    fn record(&self, id: SessionId, entry: SessionEntry);

    fn history(&self, id: SessionId) -> Vec<SessionEntry>;

    /// Drop inactive sessions, returning how many were removed
    fn evict_expired(&self) -> usize;
}

pub struct InMemorySessionStore {
    sessions: Mutex<AHashMap<SessionId, Session>>,
    ttl: Duration,
    max_history: usize,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration, max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(AHashMap::new()),
            ttl,
            max_history,
        }
    }

    pub fn from_config(config: &AssistConfig) -> Self {
        Self::new(config.session_ttl(), config.max_session_history)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.last_seen.elapsed() >= self.ttl
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, id: SessionId) -> Session {
        let mut sessions = self.sessions.lock();
        let expired = sessions.get(&id).is_some_and(|s| self.is_expired(s));
        if expired {
            tracing::debug!("Session {} expired, starting fresh", id);
            sessions.remove(&id);
        }

        let session = sessions.entry(id).or_insert_with(|| Session::new(id));
        session.last_seen = Instant::now();
        session.clone()
    }

    fn record(&self, id: SessionId, entry: SessionEntry) {
        let mut sessions = self.sessions.lock();
        let session = sessions.entry(id).or_insert_with(|| Session::new(id));
        session.history.push_back(entry);
        while session.history.len() > self.max_history {
            session.history.pop_front();
        }
        session.last_seen = Instant::now();
    }

    fn history(&self, id: SessionId) -> Vec<SessionEntry> {
        self.sessions
            .lock()
            .get(&id)
            .map(|s| s.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen.elapsed() < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str) -> SessionEntry {
        SessionEntry {
            command: command.into(),
            operation: "property_change".into(),
            message: "ok".into(),
            change_count: 1,
        }
    }

    #[test]
    fn test_create_on_first_use() {
        let store = InMemorySessionStore::new(Duration::from_secs(60), 10);
        let id = SessionId::new();
        let session = store.get_or_create(id);
        assert_eq!(session.id, id);
        assert!(session.history.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let store = InMemorySessionStore::new(Duration::from_secs(60), 3);
        let id = SessionId::new();
        for i in 0..5 {
            store.record(id, entry(&format!("command {}", i)));
        }
        let history = store.history(id);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].command, "command 2");
        assert_eq!(
            store.get_or_create(id).recent_commands(2),
            vec!["command 3".to_string(), "command 4".to_string()]
        );
    }

    #[test]
    fn test_zero_ttl_evicts_everything() {
        let store = InMemorySessionStore::new(Duration::ZERO, 3);
        store.record(SessionId::new(), entry("a"));
        store.record(SessionId::new(), entry("b"));
        assert_eq!(store.evict_expired(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_session_starts_fresh() {
        let store = InMemorySessionStore::new(Duration::ZERO, 3);
        let id = SessionId::new();
        store.record(id, entry("a"));
        assert!(store.get_or_create(id).history.is_empty());
    }

    #[test]
    fn test_live_sessions_survive_eviction() {
        let store = InMemorySessionStore::new(Duration::from_secs(3600), 3);
        store.record(SessionId::new(), entry("a"));
        assert_eq!(store.evict_expired(), 0);
        assert_eq!(store.len(), 1);
    }
}
