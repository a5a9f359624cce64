#[cfg(test)]
mod tests;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Opaque identifier of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for SessionId {
    #[inline]
    fn from(chat_id: i64) -> Self {
        Self(chat_id.to_string())
    }
}

impl From<&str> for SessionId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One question and the answer given to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a conversation is forgotten
    pub ttl_minutes: u64,
    /// Number of past turns kept per conversation
    pub max_turns: usize,
}

impl Default for SessionConfig {
    #[inline]
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_turns: 5,
        }
    }
}

#[derive(Debug)]
struct Session {
    turns: VecDeque<Turn>,
    last_active: DateTime<Utc>,
}

/// Conversation history keyed by session, with idle expiry and bounded length
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    ttl: TimeDelta,
    max_turns: usize,
}

impl SessionStore {
    #[inline]
    pub fn new(ttl: TimeDelta, max_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_turns,
        }
    }

    #[inline]
    pub fn from_config(config: &SessionConfig) -> Self {
        let minutes = i64::try_from(config.ttl_minutes).unwrap_or(i64::MAX);
        let ttl = TimeDelta::try_minutes(minutes).unwrap_or(TimeDelta::MAX);
        Self::new(ttl, config.max_turns)
    }

    #[inline]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    #[inline]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Past turns of a live session, oldest first
    #[inline]
    pub fn history(&self, id: &SessionId) -> Vec<Turn> {
        self.history_at(id, Utc::now())
    }

    /// Same as [`SessionStore::history`] with an explicit clock
    ///
    /// An expired session is evicted and reported as empty.
    #[inline]
    pub fn history_at(&self, id: &SessionId, now: DateTime<Utc>) -> Vec<Turn> {
        let mut sessions = self.lock();
        let expired = sessions.get(id).map(|s| self.is_expired(s, now));

        match expired {
            Some(true) => {
                sessions.remove(id);
                debug!("Session {} expired", id);
                Vec::new()
            }
            Some(false) => sessions
                .get(id)
                .map(|s| s.turns.iter().cloned().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Append a turn and refresh the session's activity time
    #[inline]
    pub fn record(&self, id: &SessionId, question: &str, answer: &str) {
        self.record_at(id, question, answer, Utc::now());
    }

    #[inline]
    pub fn record_at(&self, id: &SessionId, question: &str, answer: &str, now: DateTime<Utc>) {
        let mut sessions = self.lock();
        let session = sessions.entry(id.clone()).or_insert_with(|| Session {
            turns: VecDeque::new(),
            last_active: now,
        });

        if self.is_expired(session, now) {
            session.turns.clear();
        }

        session.turns.push_back(Turn {
            question: question.to_owned(),
            answer: answer.to_owned(),
            at: now,
        });
        while session.turns.len() > self.max_turns {
            session.turns.pop_front();
        }
        session.last_active = now;
    }

    /// Forget a session. Returns whether it existed.
    #[inline]
    pub fn end(&self, id: &SessionId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drop every expired session and return how many were removed
    #[inline]
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    #[inline]
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        let removed = before - sessions.len();

        if removed > 0 {
            debug!("Purged {} expired sessions", removed);
        }
        removed
    }

    /// Number of stored sessions, including ones not yet purged
    #[inline]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.last_active) > self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    #[inline]
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
