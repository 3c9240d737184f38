// Session registry for concurrent conversations

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::{ConversationAnalysis, SessionReport};
use crate::recommend::RecommendationBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message; never modified after it is appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-session state
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    report: Option<SessionReport>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            created_at: now,
            last_activity: now,
            ended_at: None,
            report: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn user_turns(&self) -> Vec<&str> {
        self.turns
            .iter()
            .filter(|t| t.role == Role::User && !t.content.is_empty())
            .map(|t| t.content.as_str())
            .collect()
    }

    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    fn push(&mut self, role: Role, content: String) -> PipelineResult<()> {
        if !self.is_active() {
            return Err(PipelineError::SessionEnded(self.id.clone()));
        }
        self.turns.push(Turn { role, content });
        self.last_activity = Utc::now();
        Ok(())
    }

    /// Mark ended and cache the report
    pub fn finish(&mut self, ended_at: DateTime<Utc>, report: SessionReport) {
        self.ended_at = Some(ended_at);
        self.last_activity = ended_at;
        self.report = Some(report);
    }

    fn is_expired(&self, now: DateTime<Utc>, config: &SessionConfig) -> bool {
        match self.ended_at {
            Some(ended) => {
                now.signed_duration_since(ended)
                    >= ChronoDuration::minutes(config.ended_retention_minutes as i64)
            }
            None => {
                now.signed_duration_since(self.last_activity)
                    >= ChronoDuration::minutes(config.idle_timeout_minutes as i64)
            }
        }
    }
}

/// Privacy-stripped view of a session: counts and results, no text
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub message_count: usize,
    pub analysis: Option<ConversationAnalysis>,
    pub recommendations: Option<RecommendationBundle>,
}

type SessionHandle = Arc<Mutex<Session>>;

/// Concurrent session registry
///
/// Each session sits behind its own mutex, so mutations of one session are
/// serialized while different sessions proceed independently.
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Create a session with a fresh identifier
    pub fn create(&self) -> PipelineResult<String> {
        let id = Uuid::new_v4().to_string();
        self.insert(id.clone())?;
        Ok(id)
    }

    /// Return `session_id` if known, otherwise create it (or a fresh one)
    pub fn get_or_create(&self, session_id: Option<&str>) -> PipelineResult<String> {
        match session_id {
            Some(id) if self.sessions.contains_key(id) => Ok(id.to_string()),
            Some(id) => {
                self.insert(id.to_string())?;
                Ok(id.to_string())
            }
            None => self.create(),
        }
    }

    fn insert(&self, id: String) -> PipelineResult<()> {
        self.ensure_capacity()?;
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id.clone()))));
        tracing::info!(session_id = %id, "Created new session");
        Ok(())
    }

    fn ensure_capacity(&self) -> PipelineResult<()> {
        if self.sessions.len() < self.config.max_sessions {
            return Ok(());
        }
        self.evict_expired();
        let active = self.sessions.len();
        if active >= self.config.max_sessions {
            return Err(PipelineError::SessionLimit {
                active,
                max: self.config.max_sessions,
            });
        }
        Ok(())
    }

    fn handle(&self, session_id: &str) -> PipelineResult<SessionHandle> {
        // Clone the Arc so the map shard is not held while the session is locked
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PipelineError::SessionNotFound(session_id.to_string()))
    }

    fn lock(handle: &SessionHandle) -> MutexGuard<'_, Session> {
        // A panic elsewhere cannot leave a half-appended turn behind
        handle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to one session
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> PipelineResult<R> {
        let handle = self.handle(session_id)?;
        let mut session = Self::lock(&handle);
        Ok(f(&mut session))
    }

    /// Append a turn to an active session
    pub fn append_turn(&self, session_id: &str, role: Role, content: &str) -> PipelineResult<usize> {
        self.with_session(session_id, |session| {
            session.push(role, content.to_string())?;
            Ok(session.turns.len())
        })?
    }

    /// Record a user message and return the turns that preceded it
    ///
    /// The append and the snapshot happen under one lock, so user turns keep
    /// arrival order and each generator sees every message received before
    /// its own.
    pub fn begin_exchange(&self, session_id: &str, message: &str) -> PipelineResult<Vec<Turn>> {
        self.with_session(session_id, |session| {
            let context = session.turns.clone();
            session.push(Role::User, message.to_string())?;
            Ok(context)
        })?
    }

    /// Snapshot of the transcript
    pub fn transcript(&self, session_id: &str) -> PipelineResult<Vec<Turn>> {
        self.with_session(session_id, |session| session.turns.clone())
    }

    pub fn info(&self, session_id: &str) -> PipelineResult<SessionInfo> {
        self.with_session(session_id, |session| SessionInfo {
            id: session.id.clone(),
            created_at: session.created_at,
            ended_at: session.ended_at,
            active: session.is_active(),
            message_count: session.turns.len(),
            analysis: session.report.as_ref().map(|r| r.analysis.clone()),
            recommendations: session.report.as_ref().map(|r| r.recommendations.clone()),
        })
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of sessions held, active or ended
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions not yet ended
    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| Self::lock(entry.value()).is_active())
            .count()
    }

    /// Remove idle and retention-expired sessions
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| Self::lock(entry.value()).is_expired(now, &self.config))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed_count = 0;
        for session_id in expired {
            if self.sessions.remove(&session_id).is_some() {
                removed_count += 1;
                tracing::debug!(session_id = %session_id, "Removed expired session");
            }
        }

        if removed_count > 0 {
            tracing::info!(
                removed = removed_count,
                remaining = self.sessions.len(),
                "Cleaned up expired sessions"
            );
        }
        removed_count
    }

    /// Start a background eviction loop on the current tokio runtime
    pub fn spawn_cleanup_task(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            loop {
                interval.tick().await;
                store.evict_expired();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_sessions: usize) -> SessionConfig {
        SessionConfig {
            max_sessions,
            idle_timeout_minutes: 30,
            ended_retention_minutes: 10,
        }
    }

    #[test]
    fn test_session_creation() {
        let store = SessionStore::new(config(10));

        let first = store.create().unwrap();
        let second = store.create().unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_count(), 2);
    }

    #[test]
    fn test_get_or_create_keeps_known_ids() {
        let store = SessionStore::new(config(10));

        let id = store.get_or_create(None).unwrap();
        assert_eq!(store.get_or_create(Some(&id)).unwrap(), id);
        assert_eq!(store.get_or_create(Some("client-chosen")).unwrap(), "client-chosen");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_preserves_order() {
        let store = SessionStore::new(config(10));
        let id = store.create().unwrap();

        store.append_turn(&id, Role::User, "first").unwrap();
        store.append_turn(&id, Role::Assistant, "second").unwrap();
        assert_eq!(store.append_turn(&id, Role::User, "third").unwrap(), 3);

        let transcript = store.transcript(&id).unwrap();
        let contents: Vec<&str> = transcript.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_begin_exchange_returns_prior_turns() {
        let store = SessionStore::new(config(10));
        let id = store.create().unwrap();

        assert!(store.begin_exchange(&id, "hello").unwrap().is_empty());
        let context = store.begin_exchange(&id, "still there?").unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].content, "hello");
        assert_eq!(store.transcript(&id).unwrap().len(), 2);

        store
            .with_session(&id, |session| session.ended_at = Some(Utc::now()))
            .unwrap();
        assert!(matches!(
            store.begin_exchange(&id, "late"),
            Err(PipelineError::SessionEnded(_))
        ));
    }

    #[test]
    fn test_unknown_session_not_found() {
        let store = SessionStore::new(config(10));
        assert!(matches!(
            store.append_turn("missing", Role::User, "hi"),
            Err(PipelineError::SessionNotFound(_))
        ));
        assert!(matches!(store.info("missing"), Err(PipelineError::SessionNotFound(_))));
    }

    #[test]
    fn test_session_limit() {
        let store = SessionStore::new(config(2));
        store.create().unwrap();
        store.create().unwrap();

        let result = store.create();
        assert!(matches!(result, Err(PipelineError::SessionLimit { active: 2, max: 2 })));
        assert!(result.unwrap_err().to_string().contains("Maximum session limit"));
    }

    #[test]
    fn test_idle_sessions_evicted() {
        let store = SessionStore::new(config(10));
        let id = store.create().unwrap();

        assert_eq!(store.evict_expired_at(Utc::now()), 0);
        let later = Utc::now() + ChronoDuration::minutes(31);
        assert_eq!(store.evict_expired_at(later), 1);
        assert!(!store.contains(&id));
    }

    #[test]
    fn test_info_has_no_text() {
        let store = SessionStore::new(config(10));
        let id = store.create().unwrap();
        store.append_turn(&id, Role::User, "private words").unwrap();

        let info = store.info(&id).unwrap();
        assert_eq!(info.message_count, 1);
        assert!(info.active);
        assert!(info.analysis.is_none());
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("private words"));
    }

    #[tokio::test]
    async fn test_cleanup_task_runs() {
        let store = Arc::new(SessionStore::new(SessionConfig {
            max_sessions: 10,
            idle_timeout_minutes: 0,
            ended_retention_minutes: 0,
        }));
        store.create().unwrap();

        let task = store.spawn_cleanup_task(Duration::from_millis(10));
        time::sleep(Duration::from_millis(50)).await;
        task.abort();

        assert_eq!(store.len(), 0);
    }
}
