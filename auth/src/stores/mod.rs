//! Storage implementations for the auth layer.
//!
//! - **Session Store** (Redis) - ephemeral session storage with TTL

pub mod session_redis;

pub use session_redis::RedisSessionStore;
