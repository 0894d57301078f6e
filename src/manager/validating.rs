//! Validating session manager.
//!
//! Orchestrates the session lifecycle: on-read validation, lazy activation
//! of the background validation scheduler, the periodic sweep over all
//! active sessions, and termination notification. Storage and scheduling
//! are pluggable collaborators; this type owns only the orchestration.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::error::SessionError;
use crate::scheduler::{SessionValidator, TokioValidationScheduler, ValidationScheduler};
use crate::session::{Session, SessionContext, SessionKey};
use crate::store::SessionStore;

use super::config::SessionManagerConfig;
use super::hooks::{NoopHooks, SessionHooks, SessionListener};

/// Session manager with interposed liveness validation.
///
/// Every session returned by [`get`](Self::get) has passed validation
/// between storage retrieval and return; a caller never observes a
/// terminal (expired or stopped) session as a successful result. Orphaned
/// sessions that nobody reads again are reaped by the periodic sweep,
/// which the manager activates lazily on the first create/get.
///
/// Constructed behind an `Arc` because the default scheduler needs a weak
/// handle back to the manager as its sweep target.
pub struct ValidatingSessionManager {
    store: Arc<dyn SessionStore>,
    hooks: Arc<dyn SessionHooks>,
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,

    /// The only shared mutable field with a locking discipline: enable and
    /// disable are critical sections over this mutex; everything else runs
    /// without it.
    scheduler: Mutex<Option<Box<dyn ValidationScheduler>>>,

    scheduler_enabled: bool,
    validation_interval: Duration,
}

impl ValidatingSessionManager {
    /// Manager with no-op hooks.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionManagerConfig) -> Arc<Self> {
        Self::with_hooks(store, config, Arc::new(NoopHooks))
    }

    /// Manager with a custom hook set.
    pub fn with_hooks(
        store: Arc<dyn SessionStore>,
        config: SessionManagerConfig,
        hooks: Arc<dyn SessionHooks>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            hooks,
            listeners: RwLock::new(Vec::new()),
            scheduler: Mutex::new(None),
            scheduler_enabled: config.scheduler_enabled,
            validation_interval: config.validation_interval(),
        })
    }

    /// Register a listener for terminal-transition notifications.
    pub fn register_listener(&self, listener: Arc<dyn SessionListener>) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(listener);
        }
    }

    /// Replace the validation scheduler. The supplied instance is assumed
    /// to know its own cadence; the configured interval only applies to the
    /// default scheduler.
    pub fn set_validation_scheduler(&self, scheduler: Box<dyn ValidationScheduler>) {
        if let Ok(mut guard) = self.scheduler.lock() {
            *guard = Some(scheduler);
        }
    }

    /// Create a new session from the given context.
    ///
    /// Ensures the validation scheduler is running before delegating to the
    /// store. The fresh session is not validated (it is definitionally
    /// live).
    pub fn create(
        self: &Arc<Self>,
        ctx: SessionContext,
    ) -> Result<Arc<dyn Session>, SessionError> {
        self.enable_session_validation_if_necessary();
        let session = self.store.create(ctx)?;
        debug!(session_id = %session.id(), "Created session");
        Ok(session)
    }

    /// Look up a session and validate it before returning.
    ///
    /// An unknown key propagates as [`SessionError::Unknown`] without
    /// touching any hooks. A terminal session fires its notification path
    /// and then fails with the typed terminal error.
    pub fn get(self: &Arc<Self>, key: &SessionKey) -> Result<Arc<dyn Session>, SessionError> {
        self.enable_session_validation_if_necessary();
        trace!(key = %key, "Attempting to retrieve session");
        let session = self.store.retrieve(key)?;
        self.validate(session.as_ref(), key)?;
        Ok(session)
    }

    /// Validate one session, dispatching notification on failure.
    ///
    /// # Panics
    ///
    /// Panics if the session type does not expose a validating facet: there
    /// is no general way to check the liveness of an opaque session, and
    /// silently skipping the check would let terminal sessions through.
    fn validate(&self, session: &dyn Session, key: &SessionKey) -> Result<(), SessionError> {
        match self.do_validate(session) {
            Ok(()) => Ok(()),
            Err(err) if err.is_expired() => {
                self.on_expiration(session, key)?;
                Err(err)
            }
            Err(err) if err.is_invalid() => {
                self.on_invalidation(session, &err, key)?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn do_validate(&self, session: &dyn Session) -> Result<(), SessionError> {
        match session.as_validating() {
            Some(validating) => validating.validate(),
            None => panic!(
                "session {} does not expose a validating facet; \
                 the session type must implement ValidatingSession to be \
                 managed by ValidatingSessionManager",
                session.id()
            ),
        }
    }

    /// Expiration path: change hook, listener fan-out, then the cleanup
    /// hook, which runs even when an earlier step failed. A change/notify
    /// failure propagates after cleanup; a cleanup failure is logged and
    /// never replaces a pending error.
    fn on_expiration(&self, session: &dyn Session, key: &SessionKey) -> Result<(), SessionError> {
        trace!(session_id = %session.id(), key = %key, "Session has expired");

        let notified = self
            .hooks
            .on_change(session)
            .and_then(|_| self.notify_expiration(session));

        if let Err(err) = self.hooks.after_expired(session) {
            warn!(session_id = %session.id(), error = %err, "After-expired cleanup hook failed");
        }

        notified.map_err(SessionError::Hook)
    }

    /// Stop path. An expiration failure routed here is redirected entirely
    /// to the expiration path: expiration subsumes invalidation, and a
    /// session is never notified on both.
    fn on_invalidation(
        &self,
        session: &dyn Session,
        err: &SessionError,
        key: &SessionKey,
    ) -> Result<(), SessionError> {
        if err.is_expired() {
            return self.on_expiration(session, key);
        }

        trace!(session_id = %session.id(), "Session is invalid (stopped)");

        let notified = self
            .hooks
            .on_stop(session)
            .and_then(|_| self.notify_stop(session));

        if let Err(err) = self.hooks.after_stopped(session) {
            warn!(session_id = %session.id(), error = %err, "After-stopped cleanup hook failed");
        }

        notified.map_err(SessionError::Hook)
    }

    fn notify_expiration(&self, session: &dyn Session) -> anyhow::Result<()> {
        if let Ok(listeners) = self.listeners.read() {
            for listener in listeners.iter() {
                listener.on_expiration(session)?;
            }
        }
        Ok(())
    }

    fn notify_stop(&self, session: &dyn Session) -> anyhow::Result<()> {
        if let Ok(listeners) = self.listeners.read() {
            for listener in listeners.iter() {
                listener.on_stop(session)?;
            }
        }
        Ok(())
    }

    /// Advisory activation gate: configured enabled and no live scheduler
    /// means enable. The check only try-locks; losing the race to an
    /// enable/disable already in progress is benign, since the next call
    /// re-triggers the gate and the enable itself is idempotent.
    fn enable_session_validation_if_necessary(self: &Arc<Self>) {
        if !self.scheduler_enabled {
            return;
        }

        let needs_enable = match self.scheduler.try_lock() {
            Ok(guard) => guard.as_ref().map_or(true, |s| !s.is_enabled()),
            Err(_) => false,
        };

        if needs_enable {
            self.enable_session_validation();
        }
    }

    /// Start periodic validation. Critical section: at most one thread
    /// creates/enables the scheduler at a time, and calling when already
    /// enabled is a no-op.
    pub fn enable_session_validation(self: &Arc<Self>) {
        let mut newly_enabled = false;

        if let Ok(mut guard) = self.scheduler.lock() {
            if guard.is_none() {
                debug!("No validation scheduler set, creating default instance");
                let target: std::sync::Weak<dyn SessionValidator> =
                    Arc::downgrade(&(Arc::clone(self) as Arc<dyn SessionValidator>));
                *guard = Some(Box::new(TokioValidationScheduler::new(
                    self.validation_interval,
                    target,
                )));
            }

            if let Some(scheduler) = guard.as_mut() {
                if !scheduler.is_enabled() {
                    info!(
                        interval_ms = self.validation_interval.as_millis() as u64,
                        "Enabling session validation scheduler"
                    );
                    scheduler.enable();
                    newly_enabled = true;
                }
            }
        }

        // Hook fires outside the critical section so it may call back into
        // the manager without deadlocking.
        if newly_enabled {
            self.hooks.after_validation_enabled();
        }
    }

    /// Stop periodic validation and release the scheduler.
    ///
    /// Runs during teardown: a failure from the scheduler's own disable is
    /// logged and suppressed, and the scheduler reference is cleared either
    /// way. Idempotent.
    pub fn disable_session_validation(&self) {
        self.hooks.before_validation_disabled();

        if let Ok(mut guard) = self.scheduler.lock() {
            if let Some(mut scheduler) = guard.take() {
                match scheduler.disable() {
                    Ok(()) => info!("Disabled session validation scheduler"),
                    Err(err) => {
                        debug!(
                            error = %err,
                            "Unable to disable validation scheduler, ignoring (shutting down)"
                        );
                    }
                }
                // Scheduler drops here; the slot stays empty.
            }
        }
    }

    /// True while a scheduler is set and enabled.
    pub fn is_session_validation_enabled(&self) -> bool {
        self.scheduler
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|s| s.is_enabled()))
            .unwrap_or(false)
    }

    /// Tear down the manager's scheduling resources.
    pub fn destroy(&self) {
        self.disable_session_validation();
    }

    /// Validate every active session, notifying termination per failure.
    ///
    /// Best-effort over the full set: an invalid session (or a failing
    /// hook) is counted and swallowed, never aborting the batch. Returns
    /// the number of sessions invalidated during this sweep.
    ///
    /// Lookup keys are synthesized from the session id alone; any richer
    /// context the original retrieval carried is not reconstructed here.
    pub fn validate_sessions(&self) -> usize {
        info!("Validating all active sessions");
        let mut invalidated = 0;

        for session in self.store.active_sessions() {
            let key = SessionKey::new(session.id());
            if let Err(err) = self.validate(session.as_ref(), &key) {
                debug!(
                    session_id = %session.id(),
                    expired = err.is_expired(),
                    "Invalidated session during sweep"
                );
                invalidated += 1;
            }
        }

        if invalidated > 0 {
            info!(invalidated, "Finished session validation, sessions stopped");
        } else {
            info!("Finished session validation, no sessions stopped");
        }
        invalidated
    }
}

impl SessionValidator for ValidatingSessionManager {
    fn validate_sessions(&self) -> usize {
        ValidatingSessionManager::validate_sessions(self)
    }
}

impl Drop for ValidatingSessionManager {
    fn drop(&mut self) {
        self.disable_session_validation();
    }
}
