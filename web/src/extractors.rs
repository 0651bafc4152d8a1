//! Custom Axum extractors.
//!
//! - `BearerToken`: session id from `Authorization: Bearer <token>`
//! - `SessionUser`: the live session and account behind the token
//! - `OptionalSessionUser`: same, but anonymous callers pass through
//! - `ApiJson` / `ApiPath` / `ApiQuery`: std extractors whose rejections
//!   become [`AppError`] bodies
//! - `CorrelationId`, `ClientIp`, `UserAgent`: request metadata
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     caller: SessionUser,
//!     ApiPath(id): ApiPath<EventId>,
//! ) -> Result<Json<Event>, AppError> {
//!     access::require_role(&caller.actor, &[Role::Organizer])?;
//!     Ok(Json(state.events.get_event(id).await?))
//! }
//! ```

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use ticketing_auth::{Session, SessionId};
use ticketing_core::access::Actor;
use ticketing_core::model::User;
use ticketing_core::StoreError;
use uuid::Uuid;

// ============================================================================
// Rejection-mapped std extractors
// ============================================================================

/// `axum::Json` with malformed bodies reported as `400 {code, message}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with bad ids reported as `400 {code, message}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with bad parameters reported as `400 {code, message}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

// ============================================================================
// Authentication
// ============================================================================

/// Session id presented as a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerToken(pub SessionId);

impl BearerToken {
    fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, AppError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Not authorized, token failed"))?;
        let session_id = token
            .parse::<SessionId>()
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))?;
        Ok(Some(Self(session_id)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)?
            .ok_or_else(|| AppError::unauthorized("Not authorized, no token"))
    }
}

/// An authenticated caller.
///
/// The session is touched on every request and the account is re-read, so
/// role changes and deletions apply to sessions that are already open.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The live session
    pub session: Session,
    /// The account, as currently stored
    pub user: User,
    /// Identity used for access checks
    pub actor: Actor,
}

impl SessionUser {
    async fn resolve(state: &AppState, token: BearerToken) -> Result<Self, AppError> {
        let session = state
            .sessions
            .touch_session(token.0, state.clock.now())
            .await?;

        let user = match state.users.get_user(session.user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!(session_id = %session.session_id, "Session for deleted account");
                return Err(AppError::unauthorized("Not authorized, user not found"));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            actor: Actor::new(user.id, user.role),
            session,
            user,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state).await?;
        Self::resolve(state, token).await
    }
}

/// A caller who may or may not be logged in.
///
/// Missing or stale tokens resolve to `None` instead of rejecting.
#[derive(Debug, Clone)]
pub struct OptionalSessionUser(pub Option<SessionUser>);

impl OptionalSessionUser {
    /// Access identity of the caller, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref().map(|caller| &caller.actor)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalSessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(Some(token)) = BearerToken::from_headers(&parts.headers) else {
            return Ok(Self(None));
        };
        match SessionUser::resolve(state, token).await {
            Ok(caller) => Ok(Self(Some(caller))),
            Err(e) if e.status().is_server_error() => Err(e),
            Err(_) => Ok(Self(None)),
        }
    }
}

// ============================================================================
// Request metadata
// ============================================================================

/// Correlation ID for request tracing.
///
/// Reads the id stored by [`correlation_id_layer`](crate::middleware::correlation_id_layer),
/// falling back to the `X-Correlation-ID` header or a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<CorrelationId>() {
            return Ok(*id);
        }
        let correlation_id = parts
            .headers
            .get(crate::middleware::CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Client IP address.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Connection IP, when the server was started with connect info
/// 4. `127.0.0.1`
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let connected = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        Ok(Self(client_ip(&parts.headers, connected)))
    }
}

fn client_ip(headers: &HeaderMap, connected: Option<IpAddr>) -> IpAddr {
    let forwarded: Option<IpAddr> = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());
    let real = || -> Option<IpAddr> {
        headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    };

    forwarded
        .or_else(real)
        .or(connected)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// User-Agent header, or `"Unknown"`.
#[derive(Debug, Clone)]
pub struct UserAgent(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserAgent
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("Unknown")
            .to_string();

        Ok(Self(user_agent))
    }
}
