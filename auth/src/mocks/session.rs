//! Mock session store for testing.

use crate::error::{AuthError, Result};
use crate::providers::{SessionFuture, SessionStore};
use crate::session::{Session, SessionId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use ticketing_core::types::UserId;

/// Mock session store.
///
/// Uses in-memory storage for testing. Like the Redis store, `get_session`
/// checks expiry against the wall clock and `touch_session` against the
/// time it is given.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl MockSessionStore {
    /// Create a new mock session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Insert a session directly, bypassing duplicate checks (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn insert(&self, session: Session) -> Result<()> {
        self.lock()?.insert(session.session_id, session);
        Ok(())
    }

    fn live(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<Session> {
        let session = self
            .lock()?
            .get(&session_id)
            .cloned()
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired(now) {
            return Err(AuthError::SessionExpired);
        }
        Ok(session)
    }
}

impl SessionStore for MockSessionStore {
    fn create_session(&self, session: Session, _ttl: Duration) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            let mut sessions = self.lock()?;
            if sessions.contains_key(&session.session_id) {
                return Err(AuthError::InternalError(
                    "Session ID already exists".to_string(),
                ));
            }
            sessions.insert(session.session_id, session);
            Ok(())
        })
    }

    fn get_session(&self, session_id: SessionId) -> SessionFuture<'_, Session> {
        Box::pin(async move { self.live(session_id, Utc::now()) })
    }

    fn touch_session(
        &self,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> SessionFuture<'_, Session> {
        Box::pin(async move {
            let mut sessions = self.lock()?;
            let session = sessions
                .get_mut(&session_id)
                .ok_or(AuthError::SessionNotFound)?;
            if session.is_expired(now) {
                return Err(AuthError::SessionExpired);
            }
            session.last_active = now;
            Ok(session.clone())
        })
    }

    fn delete_session(&self, session_id: SessionId) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            self.lock()?.remove(&session_id);
            Ok(())
        })
    }

    fn delete_user_sessions(&self, user_id: UserId) -> SessionFuture<'_, usize> {
        Box::pin(async move {
            let mut sessions = self.lock()?;
            let before = sessions.len();
            sessions.retain(|_, s| s.user_id != user_id);
            Ok(before - sessions.len())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use ticketing_core::types::Role;

    fn session(user_id: UserId, ttl: Duration) -> Session {
        Session::start(
            user_id,
            "mock@example.com".to_string(),
            Role::User,
            Utc::now(),
            ttl,
        )
    }

    #[tokio::test]
    async fn create_and_get() {
        let store = MockSessionStore::new();
        let s = session(UserId::new(), Duration::hours(1));
        store.create_session(s.clone(), Duration::hours(1)).await.unwrap();

        assert_eq!(store.get_session(s.session_id).await.unwrap(), s);
        assert!(store.create_session(s, Duration::hours(1)).await.is_err());
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let store = MockSessionStore::new();
        let s = session(UserId::new(), Duration::seconds(-1));
        store.insert(s.clone()).unwrap();

        assert_eq!(
            store.get_session(s.session_id).await,
            Err(AuthError::SessionExpired)
        );
    }

    #[tokio::test]
    async fn touch_moves_last_active_only() {
        let store = MockSessionStore::new();
        let s = session(UserId::new(), Duration::hours(1));
        store.insert(s.clone()).unwrap();

        let later = s.last_active + Duration::minutes(5);
        let touched = store.touch_session(s.session_id, later).await.unwrap();
        assert_eq!(touched.last_active, later);
        assert_eq!(touched.expires_at, s.expires_at);
    }

    #[tokio::test]
    async fn touch_after_logout_does_not_restore_the_session() {
        let store = MockSessionStore::new();
        let s = session(UserId::new(), Duration::hours(1));
        store.insert(s.clone()).unwrap();

        store.delete_session(s.session_id).await.unwrap();
        assert_eq!(
            store.touch_session(s.session_id, Utc::now()).await,
            Err(AuthError::SessionNotFound)
        );
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn revocation_wins_against_concurrent_touches() {
        let store = MockSessionStore::new();
        for _ in 0..500 {
            let user = UserId::new();
            let s = session(user, Duration::hours(1));
            store.insert(s.clone()).unwrap();

            let toucher = {
                let store = store.clone();
                tokio::spawn(async move { store.touch_session(s.session_id, Utc::now()).await })
            };
            let revoker = {
                let store = store.clone();
                tokio::spawn(async move { store.delete_user_sessions(user).await })
            };
            let _ = toucher.await.unwrap();
            revoker.await.unwrap().unwrap();

            assert_eq!(
                store.get_session(s.session_id).await,
                Err(AuthError::SessionNotFound)
            );
        }
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_user_sessions_only_hits_that_user() {
        let store = MockSessionStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        store.insert(session(alice, Duration::hours(1))).unwrap();
        store.insert(session(alice, Duration::hours(1))).unwrap();
        store.insert(session(bob, Duration::hours(1))).unwrap();

        assert_eq!(store.delete_user_sessions(alice).await.unwrap(), 2);
        assert_eq!(store.session_count().unwrap(), 1);
    }
}
