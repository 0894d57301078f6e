//! Periodic validation scheduling.
//!
//! A `ValidationScheduler` drives the manager's sweep entry point on a
//! timer. The tokio-backed reference implementation spawns an abortable
//! background task; the manager only assumes the contract (enable, disable,
//! is_enabled), so any other execution substrate can be plugged in.

use anyhow::Result;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

/// Target of a periodic sweep: validates every active session and reports
/// how many were invalidated.
pub trait SessionValidator: Send + Sync {
    fn validate_sessions(&self) -> usize;
}

/// Periodic-callback driver for validation sweeps.
///
/// Lifecycle: disabled (initial) → enabled → disabled. Both transitions are
/// idempotent.
pub trait ValidationScheduler: Send + Sync {
    /// Begin firing sweeps on the configured cadence. No-op when already
    /// enabled.
    fn enable(&mut self);

    /// Stop firing. Must be safe to call when already disabled.
    fn disable(&mut self) -> Result<()>;

    /// True while the periodic callback is active.
    fn is_enabled(&self) -> bool;
}

/// Reference scheduler: a tokio background task firing the sweep on a fixed
/// interval.
///
/// Holds only a weak reference to the sweep target, so a dropped manager
/// stops the task on its next tick instead of being kept alive by it.
pub struct TokioValidationScheduler {
    interval: Duration,
    validator: Weak<dyn SessionValidator>,
    handle: Option<JoinHandle<()>>,
}

impl TokioValidationScheduler {
    /// Scheduler firing `validator.validate_sessions()` every `interval`.
    ///
    /// Must be enabled from within a tokio runtime.
    pub fn new(interval: Duration, validator: Weak<dyn SessionValidator>) -> Self {
        Self {
            interval,
            validator,
            handle: None,
        }
    }
}

impl ValidationScheduler for TokioValidationScheduler {
    fn enable(&mut self) {
        if self.is_enabled() {
            return;
        }

        let validator = Weak::clone(&self.validator);
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(validator) = validator.upgrade() else {
                    debug!("Sweep target dropped, stopping validation task");
                    break;
                };

                let invalidated = validator.validate_sessions();
                if invalidated > 0 {
                    info!(invalidated, "Session validation sweep completed");
                } else {
                    debug!("Session validation sweep: no invalid sessions");
                }
            }
        }));
    }

    fn disable(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TokioValidationScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingValidator {
        sweeps: AtomicUsize,
    }

    impl CountingValidator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sweeps: AtomicUsize::new(0),
            })
        }

        fn sweeps(&self) -> usize {
            self.sweeps.load(Ordering::SeqCst)
        }
    }

    impl SessionValidator for CountingValidator {
        fn validate_sessions(&self) -> usize {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    fn weak_target(validator: &Arc<CountingValidator>) -> Weak<dyn SessionValidator> {
        Arc::downgrade(&(Arc::clone(validator) as Arc<dyn SessionValidator>))
    }

    #[tokio::test]
    async fn test_fires_periodically_and_stops_on_disable() {
        let validator = CountingValidator::new();
        let mut scheduler =
            TokioValidationScheduler::new(Duration::from_millis(20), weak_target(&validator));

        assert!(!scheduler.is_enabled());
        scheduler.enable();
        assert!(scheduler.is_enabled());

        tokio::time::sleep(Duration::from_millis(110)).await;
        let fired = validator.sweeps();
        assert!(fired >= 2, "expected at least 2 sweeps, got {fired}");

        scheduler.disable().unwrap();
        assert!(!scheduler.is_enabled());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(validator.sweeps(), fired, "sweeps fired after disable");
    }

    #[tokio::test]
    async fn test_enable_is_idempotent() {
        let validator = CountingValidator::new();
        let mut scheduler =
            TokioValidationScheduler::new(Duration::from_millis(20), weak_target(&validator));

        scheduler.enable();
        scheduler.enable();
        assert!(scheduler.is_enabled());

        // A single disable stops everything: only one task was running.
        scheduler.disable().unwrap();
        assert!(!scheduler.is_enabled());
    }

    #[tokio::test]
    async fn test_disable_when_disabled_is_noop() {
        let validator = CountingValidator::new();
        let mut scheduler =
            TokioValidationScheduler::new(Duration::from_millis(20), weak_target(&validator));

        assert!(scheduler.disable().is_ok());
        scheduler.enable();
        scheduler.disable().unwrap();
        assert!(scheduler.disable().is_ok());
    }

    #[tokio::test]
    async fn test_task_exits_when_target_dropped() {
        let validator = CountingValidator::new();
        let mut scheduler =
            TokioValidationScheduler::new(Duration::from_millis(10), weak_target(&validator));

        scheduler.enable();
        drop(validator);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!scheduler.is_enabled(), "task should exit once target is gone");
    }
}
