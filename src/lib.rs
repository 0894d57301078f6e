//! Session lifecycle core.
//!
//! Manages creation, lookup, periodic liveness validation, and termination
//! notification for stateful sessions. The hard part of the lifecycle is
//! that nothing actively pushes a session into its terminal state: idle
//! timeout is discovered lazily on read, or by a periodic sweep that reaps
//! sessions nobody reads again. This crate guarantees that
//!
//! - a read never returns an expired-but-not-yet-reaped session,
//! - orphaned sessions are eventually swept and their termination notified,
//! - enabling/disabling the background sweep is idempotent and safe under
//!   concurrent callers, and
//! - timeout expiration and explicit invalidation are kept distinct, each
//!   with its own notification path.
//!
//! Storage ([`SessionStore`]) and scheduling ([`ValidationScheduler`]) are
//! pluggable; in-memory and tokio-based reference implementations are
//! provided.

pub mod error;
pub mod manager;
pub mod scheduler;
pub mod session;
pub mod store;

pub use error::SessionError;
pub use manager::{
    NoopHooks, SessionHooks, SessionListener, SessionManagerConfig, StoreCleanupHooks,
    ValidatingSessionManager,
};
pub use scheduler::{SessionValidator, TokioValidationScheduler, ValidationScheduler};
pub use session::{
    Session, SessionContext, SessionId, SessionKey, SimpleSession, ValidatingSession,
};
pub use store::{MemorySessionStore, SessionStore};
