//! Session cache: opaque session ids mapped to user ids with a fixed TTL.
//!
//! - [`store`] -- the [`SessionStore`] trait and the Redis implementation.
//! - [`memory`] -- an in-memory store with lazy expiration, for tests.
//! - [`session`] -- id generation, key scheme, and [`SessionManager`].

pub mod memory;
pub mod session;
pub mod store;

pub use session::{Session, SessionManager, SESSION_TTL};
pub use store::{CacheError, RedisSessionStore, SessionStore};
