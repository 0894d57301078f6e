//! Extension points for session terminal transitions.
//!
//! The manager orchestrates validation; these traits let integrations
//! customize individual steps without touching that orchestration. All
//! methods default to no-ops, so implementations override only what they
//! need.

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::session::Session;
use crate::store::MemorySessionStore;

/// Template hooks invoked by the manager around terminal transitions and
/// scheduler lifecycle changes.
///
/// Failure semantics: a failing `on_change`/`on_stop` does not prevent the
/// corresponding `after_*` cleanup hook from running, but the failure still
/// surfaces to the caller of the triggering operation.
pub trait SessionHooks: Send + Sync {
    /// Persistence/cache update when a session's state changes. Runs first
    /// on the expiration path.
    fn on_change(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// Cleanup after an expiration was dispatched. Always runs, even when
    /// an earlier hook or listener failed.
    fn after_expired(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// First step on the explicit-stop path.
    fn on_stop(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// Cleanup after a stop was dispatched. Always runs, even when an
    /// earlier hook or listener failed.
    fn after_stopped(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// The validation scheduler was just enabled.
    fn after_validation_enabled(&self) {}

    /// The validation scheduler is about to be disabled. Invoked
    /// unconditionally, whether or not a scheduler is currently set.
    fn before_validation_disabled(&self) {}
}

/// No-op hook set, the default when none is supplied.
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}

/// Listener fan-out on terminal transitions, for observers that need to
/// know about every session death (audit, metrics, cache invalidation).
pub trait SessionListener: Send + Sync {
    /// The session's idle timeout elapsed.
    fn on_expiration(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// The session was explicitly stopped.
    fn on_stop(&self, _session: &dyn Session) -> Result<()> {
        Ok(())
    }
}

/// Hooks that reap terminal sessions from a `MemorySessionStore`.
///
/// Without this (or an equivalent), swept sessions stay in the store and
/// keep failing validation on every sweep; with it, the periodic sweep
/// removes them for good.
pub struct StoreCleanupHooks {
    store: Arc<MemorySessionStore>,
}

impl StoreCleanupHooks {
    pub fn new(store: Arc<MemorySessionStore>) -> Self {
        Self { store }
    }
}

impl SessionHooks for StoreCleanupHooks {
    fn after_expired(&self, session: &dyn Session) -> Result<()> {
        if self.store.remove(session.id()) {
            debug!(session_id = %session.id(), "Removed expired session from store");
        }
        Ok(())
    }

    fn after_stopped(&self, session: &dyn Session) -> Result<()> {
        if self.store.remove(session.id()) {
            debug!(session_id = %session.id(), "Removed stopped session from store");
        }
        Ok(())
    }
}
