//! Core session value types and traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::SessionError;

/// Unique session identifier (16-byte random value, hex-encoded for display
/// and storage keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId([u8; 16]);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(rand::random())
    }

    /// Convert to hex string for storage keys and logging.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != 16 {
            return None;
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Some(Self(arr))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Immutable lookup descriptor for a session.
///
/// Carries the session id plus optional request context (originating host)
/// that advanced store implementations may use. Constructed per lookup and
/// owns nothing about the session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    session_id: SessionId,
    host: Option<String>,
}

impl SessionKey {
    /// Key from a session id alone.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            host: None,
        }
    }

    /// Key with originating-host context.
    pub fn with_host(session_id: SessionId, host: impl Into<String>) -> Self {
        Self {
            session_id,
            host: Some(host.into()),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{}@{}", self.session_id, host),
            None => write!(f, "{}", self.session_id),
        }
    }
}

/// Creation context handed to the store when a new session is requested.
///
/// Opaque to the manager: hosts, timeout overrides, and free-form attributes
/// are hints for the store implementation.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Originating host of the request creating the session.
    pub host: Option<String>,

    /// Per-session timeout override. When absent, the store applies its
    /// default timeout.
    pub timeout: Option<Duration>,

    /// Free-form creation attributes (principal hints, etc).
    pub attributes: HashMap<String, String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A stateful interaction window for a principal.
///
/// Last-access time is owned and mutated by the session itself (or its
/// store), never by the manager.
pub trait Session: Send + Sync + std::fmt::Debug {
    /// Opaque id, stable for the session's lifetime.
    fn id(&self) -> SessionId;

    /// Creation time.
    fn start_timestamp(&self) -> DateTime<Utc>;

    /// Last access time, updated on every successful access.
    fn last_access_time(&self) -> DateTime<Utc>;

    /// Idle timeout.
    fn timeout(&self) -> Duration;

    /// Record an access, resetting the idle clock.
    fn touch(&self);

    /// Explicitly stop (invalidate) the session. Terminal and one-way.
    fn stop(&self);

    /// The validation facet of this session, if the concrete type supports
    /// validation. Session types that return `None` here cannot be managed
    /// by the validating manager.
    fn as_validating(&self) -> Option<&dyn ValidatingSession> {
        None
    }
}

/// Capability facet for session types that can check their own liveness.
pub trait ValidatingSession: Session {
    /// True while the session is neither stopped nor expired.
    fn is_valid(&self) -> bool;

    /// Check liveness. Fails with `SessionError::Stopped` or
    /// `SessionError::Expired` on a terminal session; once terminal, this
    /// never succeeds again.
    fn validate(&self) -> Result<(), SessionError>;
}
