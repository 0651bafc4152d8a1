//! Server-side sessions.
//!
//! Clients hold only the opaque [`SessionId`] as a bearer token. Everything
//! else lives in the [`SessionStore`](crate::providers::SessionStore).

use crate::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use ticketing_core::types::{Role, UserId};

/// Unique identifier for a session, handed to clients as the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// Account the session belongs to.
    pub user_id: UserId,

    /// Account email at login time.
    pub email: String,

    /// Account role at login time. Authorization re-reads the live role.
    pub role: Role,

    /// Session creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp (updated on each request).
    pub last_active: DateTime<Utc>,

    /// Session expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// IP address from which the session was created.
    pub ip_address: Option<IpAddr>,

    /// User agent string.
    pub user_agent: Option<String>,
}

impl Session {
    /// Starts a session for an account that just authenticated.
    #[must_use]
    pub fn start(
        user_id: UserId,
        email: String,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            email,
            role,
            created_at: now,
            last_active: now,
            expires_at: now + ttl,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Records where the login came from.
    #[must_use]
    pub fn with_client(mut self, ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Whether the session has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time left before expiry, never negative.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}
