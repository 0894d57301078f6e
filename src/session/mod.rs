//! Session domain types.
//!
//! This module provides the session value types (id, lookup key, creation
//! context), the `Session`/`ValidatingSession` traits, and the
//! `SimpleSession` reference implementation.

pub mod simple;
pub mod types;

pub use simple::{SimpleSession, DEFAULT_SESSION_TIMEOUT};
pub use types::{Session, SessionContext, SessionId, SessionKey, ValidatingSession};
