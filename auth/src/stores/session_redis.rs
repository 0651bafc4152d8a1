//! Redis-based session store implementation.
//!
//! Sessions are stored in Redis with:
//! - **Primary key**: `session:{session_id}` → bincode-serialized Session
//! - **User index**: `user:{user_id}:sessions` (Set) → session IDs, used to
//!   revoke every session of an account after a password reset or deletion
//! - **TTL**: the session's own remaining lifetime
//!
//! # Example
//!
//! ```no_run
//! use ticketing_auth::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{SessionFuture, SessionStore};
use crate::session::{Session, SessionId};
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use ticketing_core::types::UserId;

/// Extra lifetime of the per-user index beyond the session TTL.
const USER_INDEX_GRACE_SECONDS: u64 = 86_400;

/// Redis-based session store with TTL-based expiration.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            AuthError::InternalError(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::InternalError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Get the Redis key for a session.
    fn session_key(session_id: &SessionId) -> String {
        format!("session:{}", session_id.0)
    }

    /// Get the Redis key for user sessions set.
    fn user_sessions_key(user_id: &UserId) -> String {
        format!("user:{user_id}:sessions")
    }

    #[allow(clippy::cast_sign_loss)]
    fn ttl_seconds(ttl: Duration) -> u64 {
        ttl.num_seconds().max(1) as u64
    }

    /// `SET key value EX ttl XX`: rewrites the session only while it still
    /// exists, so a refresh racing a logout cannot bring it back.
    fn refresh_command(
        session_key: &str,
        session_bytes: Vec<u8>,
        ttl_seconds: u64,
    ) -> redis::Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(session_key)
            .arg(session_bytes)
            .arg("EX")
            .arg(ttl_seconds)
            .arg("XX");
        cmd
    }

    async fn load(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<Session> {
        let mut conn = self.conn_manager.clone();
        let session_key = Self::session_key(&session_id);

        let session_bytes: Option<Vec<u8>> = conn.get(&session_key).await.map_err(|e| {
            AuthError::InternalError(format!("Failed to get session from Redis: {e}"))
        })?;

        let Some(bytes) = session_bytes else {
            return Err(AuthError::SessionNotFound);
        };

        let session: Session = bincode::deserialize(&bytes)
            .map_err(|e| AuthError::SerializationError(e.to_string()))?;

        if session.is_expired(now) {
            tracing::warn!(
                session_id = %session_id,
                expires_at = %session.expires_at,
                "Session expired before its Redis TTL"
            );
            return Err(AuthError::SessionExpired);
        }

        Ok(session)
    }
}

impl SessionStore for RedisSessionStore {
    fn create_session(&self, session: Session, ttl: Duration) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(&session.session_id);
            let user_sessions_key = Self::user_sessions_key(&session.user_id);

            let exists: bool = conn.exists(&session_key).await.map_err(|e| {
                AuthError::InternalError(format!("Failed to check session existence: {e}"))
            })?;
            if exists {
                return Err(AuthError::InternalError("Session ID already exists".into()));
            }

            let session_bytes = bincode::serialize(&session)
                .map_err(|e| AuthError::SerializationError(e.to_string()))?;

            let ttl_seconds = Self::ttl_seconds(ttl);
            #[allow(clippy::cast_possible_wrap)]
            let index_ttl_seconds = (ttl_seconds + USER_INDEX_GRACE_SECONDS) as i64;

            let _: () = redis::pipe()
                .atomic()
                .set_ex(&session_key, session_bytes, ttl_seconds)
                .sadd(&user_sessions_key, session.session_id.to_string())
                .ignore()
                .expire(&user_sessions_key, index_ttl_seconds)
                .ignore()
                .query_async(&mut conn)
                .await
                .map_err(|e| AuthError::InternalError(format!("Failed to create session: {e}")))?;

            tracing::info!(
                session_id = %session.session_id,
                user_id = %session.user_id,
                ttl_seconds = ttl_seconds,
                "Created session in Redis"
            );

            Ok(())
        })
    }

    fn get_session(&self, session_id: SessionId) -> SessionFuture<'_, Session> {
        Box::pin(self.load(session_id, Utc::now()))
    }

    fn touch_session(
        &self,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> SessionFuture<'_, Session> {
        Box::pin(async move {
            let mut session = self.load(session_id, now).await?;
            session.last_active = now;

            let session_bytes = bincode::serialize(&session)
                .map_err(|e| AuthError::SerializationError(e.to_string()))?;
            let ttl_seconds = Self::ttl_seconds(session.remaining(now));

            let mut conn = self.conn_manager.clone();
            let written: Option<String> =
                Self::refresh_command(&Self::session_key(&session_id), session_bytes, ttl_seconds)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| {
                        AuthError::InternalError(format!("Failed to update session: {e}"))
                    })?;
            if written.is_none() {
                tracing::debug!(session_id = %session_id, "Session revoked during refresh");
                return Err(AuthError::SessionNotFound);
            }

            tracing::debug!(session_id = %session_id, ttl_seconds, "Touched session");

            Ok(session)
        })
    }

    fn delete_session(&self, session_id: SessionId) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let session_key = Self::session_key(&session_id);

            match self.load(session_id, Utc::now()).await {
                Ok(session) => {
                    let user_sessions_key = Self::user_sessions_key(&session.user_id);
                    let _: () = conn
                        .srem(&user_sessions_key, session_id.to_string())
                        .await
                        .map_err(|e| {
                            AuthError::InternalError(format!(
                                "Failed to remove session from user set: {e}"
                            ))
                        })?;
                }
                Err(AuthError::SessionNotFound | AuthError::SessionExpired) => {}
                Err(e) => return Err(e),
            }

            let _: () = conn.del(&session_key).await.map_err(|e| {
                AuthError::InternalError(format!("Failed to delete session from Redis: {e}"))
            })?;

            tracing::info!(session_id = %session_id, "Deleted session from Redis");

            Ok(())
        })
    }

    fn delete_user_sessions(&self, user_id: UserId) -> SessionFuture<'_, usize> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let user_sessions_key = Self::user_sessions_key(&user_id);

            // Runs server-side so a session created mid-revocation is not orphaned.
            let lua_script = r"
                local user_set_key = KEYS[1]
                local session_ids = redis.call('SMEMBERS', user_set_key)
                local deleted_count = 0

                for i, session_id in ipairs(session_ids) do
                    if redis.call('DEL', 'session:' .. session_id) == 1 then
                        deleted_count = deleted_count + 1
                    end
                end

                redis.call('DEL', user_set_key)
                return deleted_count
            ";

            let deleted_count: usize = redis::Script::new(lua_script)
                .key(&user_sessions_key)
                .invoke_async(&mut conn)
                .await
                .map_err(|e| {
                    AuthError::InternalError(format!("Failed to delete user sessions: {e}"))
                })?;

            tracing::info!(
                user_id = %user_id,
                session_count = deleted_count,
                "Deleted all user sessions"
            );

            Ok(deleted_count)
        })
    }
}
