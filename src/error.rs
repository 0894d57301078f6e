//! Typed session failure taxonomy.
//!
//! "Expired" is a refinement of "invalid": both are terminal, but each has
//! its own notification path. `Unknown` is a retrieval failure, not a
//! validation failure, and never triggers notification.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::session::SessionId;

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No stored session exists for the lookup key.
    #[error("unknown session: {0}")]
    Unknown(SessionId),

    /// The session's idle timeout elapsed. Terminal.
    #[error("session {id} has expired (last accessed {last_access}, timeout {timeout_secs}s)")]
    Expired {
        id: SessionId,
        last_access: DateTime<Utc>,
        timeout_secs: u64,
    },

    /// The session was explicitly stopped (logout, administrative
    /// invalidation). Terminal.
    #[error("session {0} has been stopped")]
    Stopped(SessionId),

    /// The store rejected session creation.
    #[error("session creation rejected: {0}")]
    CreationDenied(String),

    /// A notification hook or listener failed during a terminal transition.
    /// The cleanup hook has already run by the time this surfaces.
    #[error("session notification hook failed: {0}")]
    Hook(anyhow::Error),
}

impl SessionError {
    /// True for the timeout-elapsed terminal state.
    pub fn is_expired(&self) -> bool {
        matches!(self, SessionError::Expired { .. })
    }

    /// True for either terminal state (expired or stopped).
    pub fn is_invalid(&self) -> bool {
        matches!(self, SessionError::Expired { .. } | SessionError::Stopped(_))
    }
}
