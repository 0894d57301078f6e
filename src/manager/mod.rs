//! Validating session manager and its extension points.
//!
//! The manager orchestrates on-read validation, lazy scheduler activation,
//! the periodic sweep, and termination notification. Hooks and listeners
//! customize individual steps without touching the orchestration.

pub mod config;
pub mod hooks;
pub mod validating;

pub use config::{SessionManagerConfig, DEFAULT_VALIDATION_INTERVAL_MS};
pub use hooks::{NoopHooks, SessionHooks, SessionListener, StoreCleanupHooks};
pub use validating::ValidatingSessionManager;
