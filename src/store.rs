//! Session store contract and in-memory reference implementation.
//!
//! The store is the home for session state: retrieval by key, creation from
//! a context, and enumeration of everything currently stored. Validity is
//! exclusively the manager's concern: a store returns whatever it holds,
//! including sessions whose timeout has already elapsed, and the manager
//! rejects those on the way out.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

use crate::error::SessionError;
use crate::session::{Session, SessionContext, SessionId, SessionKey, SimpleSession};

/// Backing storage for sessions.
///
/// Implementations own all synchronization over session data; the manager
/// treats the store as externally synchronized.
pub trait SessionStore: Send + Sync {
    /// Look up a session by key. Fails with `SessionError::Unknown` when no
    /// session exists for the key. Never validates.
    fn retrieve(&self, key: &SessionKey) -> Result<Arc<dyn Session>, SessionError>;

    /// Construct and persist a new session for the given creation context.
    /// May fail with `SessionError::CreationDenied`.
    fn create(&self, ctx: SessionContext) -> Result<Arc<dyn Session>, SessionError>;

    /// All currently stored sessions, unordered. Used by the periodic
    /// sweep; no snapshot consistency is guaranteed beyond "stored at call
    /// time".
    fn active_sessions(&self) -> Vec<Arc<dyn Session>>;
}

/// Default number of sessions a `MemorySessionStore` will hold.
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// In-memory session store backed by a `HashMap`.
///
/// Suitable as a default for single-process deployments and as the store
/// under test fixtures. Sessions stay in the map until explicitly removed;
/// pair with cleanup hooks (see `manager::StoreCleanupHooks`) so the sweep
/// reaps terminal sessions.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<SimpleSession>>>,
    default_timeout: Duration,
    max_sessions: usize,
}

impl MemorySessionStore {
    /// Store applying `default_timeout` to sessions created without an
    /// explicit timeout override.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_timeout,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Cap the number of concurrently stored sessions. Creation beyond the
    /// cap is denied.
    pub fn with_capacity_limit(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Remove a session from the store. Returns true if it was present.
    pub fn remove(&self, id: SessionId) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(&id).is_some(),
            Err(_) => false,
        }
    }

    /// Number of currently stored sessions (for observability).
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Insert a pre-built session. Primarily for wiring up recovered or
    /// test-constructed sessions.
    pub fn insert(&self, session: Arc<SimpleSession>) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session.id(), session);
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn retrieve(&self, key: &SessionKey) -> Result<Arc<dyn Session>, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::Unknown(key.session_id()))?;

        match sessions.get(&key.session_id()) {
            Some(session) => Ok(Arc::clone(session) as Arc<dyn Session>),
            None => Err(SessionError::Unknown(key.session_id())),
        }
    }

    fn create(&self, ctx: SessionContext) -> Result<Arc<dyn Session>, SessionError> {
        let session = Arc::new(SimpleSession::from_context(&ctx, self.default_timeout));

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::CreationDenied("session store lock poisoned".into()))?;

        if sessions.len() >= self.max_sessions {
            return Err(SessionError::CreationDenied(format!(
                "session limit reached ({})",
                self.max_sessions
            )));
        }

        let id = session.id();
        sessions.insert(id, Arc::clone(&session));
        debug!(session_id = %id, stored = sessions.len(), "Created session");

        Ok(session as Arc<dyn Session>)
    }

    fn active_sessions(&self) -> Vec<Arc<dyn Session>> {
        match self.sessions.read() {
            Ok(sessions) => sessions
                .values()
                .map(|s| Arc::clone(s) as Arc<dyn Session>)
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
