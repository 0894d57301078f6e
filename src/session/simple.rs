//! Default in-memory session implementation.
//!
//! `SimpleSession` owns its own mutable state behind an `RwLock` so a single
//! instance can be shared between request handlers and the periodic sweep.
//! Both terminal transitions are one-way: once stopped or expired, `validate`
//! never succeeds again.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::SessionError;

use super::types::{Session, SessionContext, SessionId, ValidatingSession};

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct SessionState {
    last_access: DateTime<Utc>,
    stop_timestamp: Option<DateTime<Utc>>,
    expired: bool,
}

/// Reference `Session` implementation with interior mutability.
#[derive(Debug)]
pub struct SimpleSession {
    id: SessionId,
    start_timestamp: DateTime<Utc>,
    timeout: Duration,
    host: Option<String>,
    state: RwLock<SessionState>,
}

impl SimpleSession {
    /// Create a fresh session with the given idle timeout.
    pub fn new(timeout: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            start_timestamp: now,
            timeout,
            host: None,
            state: RwLock::new(SessionState {
                last_access: now,
                stop_timestamp: None,
                expired: false,
            }),
        }
    }

    /// Create a session from a creation context, falling back to
    /// `default_timeout` when the context carries no override.
    pub fn from_context(ctx: &SessionContext, default_timeout: Duration) -> Self {
        let mut session = Self::new(ctx.timeout.unwrap_or(default_timeout));
        session.host = ctx.host.clone();
        session
    }

    /// Originating host recorded at creation, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// True if the session was explicitly stopped.
    pub fn is_stopped(&self) -> bool {
        self.state
            .read()
            .map(|s| s.stop_timestamp.is_some())
            .unwrap_or(true)
    }

    /// True if the idle timeout has elapsed or the expired flag is set.
    fn is_timed_out(&self, state: &SessionState) -> bool {
        if state.expired {
            return true;
        }
        let idle_limit = match ChronoDuration::from_std(self.timeout) {
            Ok(d) => d,
            // Timeout too large for chrono arithmetic: treat as unbounded.
            Err(_) => return false,
        };
        Utc::now() > state.last_access + idle_limit
    }

    fn expired_error(&self, state: &SessionState) -> SessionError {
        SessionError::Expired {
            id: self.id,
            last_access: state.last_access,
            timeout_secs: self.timeout.as_secs(),
        }
    }
}

impl Session for SimpleSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_timestamp
    }

    fn last_access_time(&self) -> DateTime<Utc> {
        self.state
            .read()
            .map(|s| s.last_access)
            .unwrap_or(self.start_timestamp)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn touch(&self) {
        if let Ok(mut state) = self.state.write() {
            state.last_access = Utc::now();
        }
    }

    fn stop(&self) {
        if let Ok(mut state) = self.state.write() {
            if state.stop_timestamp.is_none() {
                state.stop_timestamp = Some(Utc::now());
            }
        }
    }

    fn as_validating(&self) -> Option<&dyn ValidatingSession> {
        Some(self)
    }
}

impl ValidatingSession for SimpleSession {
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<(), SessionError> {
        let mut state = match self.state.write() {
            Ok(state) => state,
            // Poisoned state means a writer panicked mid-update; the
            // session can no longer be trusted as live.
            Err(_) => return Err(SessionError::Stopped(self.id)),
        };

        if state.stop_timestamp.is_some() {
            return Err(SessionError::Stopped(self.id));
        }

        if self.is_timed_out(&state) {
            // One-way: record expiry so a later clock adjustment or touch
            // can never resurrect the session.
            state.expired = true;
            return Err(self.expired_error(&state));
        }

        Ok(())
    }
}
