//! In-process registry of running player sessions.
//!
//! A session leaves the registry when it finishes, when it is ended
//! explicitly, or when it has been idle longer than the idle timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crisis_core::error::DomainError;
use crisis_progression::domain::session::PlayerSession;
use tracing::debug;
use uuid::Uuid;

/// How long an untouched session is kept by default.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    session: PlayerSession,
    touched: Instant,
}

/// Running sessions keyed by session id.
///
/// Each session is reached only through the registry lock, so a session is
/// never mutated by two requests at once. Clones share the same map.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    /// Creates an empty registry with the default idle timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that drops sessions untouched for
    /// `idle_timeout`.
    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    /// The configured idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `session` under its own id.
    pub fn insert(&self, session: PlayerSession) {
        let entry = Entry {
            touched: Instant::now(),
            session,
        };
        self.lock().insert(entry.session.id(), entry);
    }

    /// A snapshot of the session. Counts as activity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no session has that id.
    pub fn get(&self, session_id: Uuid) -> Result<PlayerSession, DomainError> {
        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(&session_id)
            .ok_or_else(|| DomainError::not_found("session", session_id))?;
        entry.touched = Instant::now();
        Ok(entry.session.clone())
    }

    /// Runs `f` against the stored session while holding the lock.
    ///
    /// A session that is finished once `f` returns is removed from the
    /// registry; the result of `f` is still returned.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no session has that id, or the
    /// error returned by `f`.
    pub fn update<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut PlayerSession) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(&session_id)
            .ok_or_else(|| DomainError::not_found("session", session_id))?;
        entry.touched = Instant::now();
        let result = f(&mut entry.session);
        if entry.session.is_finished() {
            sessions.remove(&session_id);
            debug!(%session_id, "finished session discarded");
        }
        result
    }

    /// Removes and returns the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no session has that id.
    pub fn remove(&self, session_id: Uuid) -> Result<PlayerSession, DomainError> {
        self.lock()
            .remove(&session_id)
            .map(|entry| entry.session)
            .ok_or_else(|| DomainError::not_found("session", session_id))
    }

    /// Drops every session untouched for at least the idle timeout and
    /// returns how many were dropped.
    pub fn purge_idle(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() < self.idle_timeout);
        before - sessions.len()
    }

    /// Number of running sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
