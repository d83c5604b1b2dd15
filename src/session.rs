use crate::config::SessionConfig;
use crate::convert::ConvertedQuery;
use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub question: String,
    pub sql_query: String,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    /// Records an accepted conversion of `question`.
    pub fn record(question: &str, query: &ConvertedQuery) -> Self {
        Self {
            question: question.to_string(),
            sql_query: query.sql().to_string(),
            timestamp: Local::now(),
        }
    }

    pub fn display_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Ordered list of entries, oldest first.
#[derive(Debug, Default)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
}

impl QueryHistory {
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Session {
    history: QueryHistory,
    last_access: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: QueryHistory::default(),
            last_access: now,
        }
    }
}

/// In-memory sessions, dropped when ended or after `idle_timeout` without use.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    idle_timeout: TimeDelta,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let idle_timeout = i64::try_from(config.idle_timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn is_idle(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.last_access) > self.idle_timeout
    }

    fn evict_idle(&self, sessions: &mut HashMap<SessionId, Session>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_idle(session, now));

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
    }

    /// Looks up a live session and marks it used. Idle sessions are removed instead.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<SessionId, Session>,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<&'a mut Session, SessionError> {
        if sessions.get(&id).is_some_and(|s| self.is_idle(s, now)) {
            sessions.remove(&id);
            debug!("Session {} expired", id);
        }
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.last_access = now;
        Ok(session)
    }

    pub async fn create(&self) -> SessionId {
        self.create_at(Utc::now()).await
    }

    async fn create_at(&self, now: DateTime<Utc>) -> SessionId {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        sessions.insert(id, Session::new(now));
        info!("Session {} started", id);
        id
    }

    pub async fn end(&self, id: SessionId) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {} ended", id))
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, id, Utc::now()).is_ok()
    }

    /// Number of sessions that have not gone idle.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !self.is_idle(s, now))
            .count()
    }

    pub async fn append(&self, id: SessionId, entry: HistoryEntry) -> Result<usize, SessionError> {
        self.append_at(id, entry, Utc::now()).await
    }

    async fn append_at(
        &self,
        id: SessionId,
        entry: HistoryEntry,
        now: DateTime<Utc>,
    ) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        let session = self.touch(&mut sessions, id, now)?;
        session.history.append(entry);
        Ok(session.history.len())
    }

    pub async fn list(&self, id: SessionId) -> Result<Vec<HistoryEntry>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, id, Utc::now())?;
        Ok(session.history.list().to_vec())
    }

    pub async fn clear(&self, id: SessionId) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, id, Utc::now())?;
        session.history.clear();
        Ok(())
    }
}
