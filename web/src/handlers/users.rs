//! Account endpoints under `/users`.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, SessionUser};
use crate::handlers::events::{EventAnalytics, analytics_for};
use crate::state::AppState;
use axum::{Json, extract::State};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{Value, json};
use ticketing_auth::AuthError;
use ticketing_auth::utils::is_valid_email;
use ticketing_core::access::require_role;
use ticketing_core::model::{Booking, BookingQuery, Event, EventQuery, ProfileUpdate, User};
use ticketing_core::types::{Role, UserId};
use ticketing_core::validation;

/// `PUT /users/:id/role` body.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// New role name
    #[serde(default)]
    pub role: String,
}

/// All accounts (admin).
///
/// # Errors
///
/// 401 / 403 unless the caller is an admin.
pub async fn list_users(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    Ok(Json(state.users.list_users().await?))
}

/// The caller's own account.
///
/// # Errors
///
/// 401 without a live session.
#[allow(clippy::unused_async)]
pub async fn get_profile(caller: SessionUser) -> Result<Json<User>, AppError> {
    Ok(Json(caller.user))
}

/// Updates the caller's name, email or contact details.
///
/// Empty `phone`, `address` or `profilePicture` clear the field.
///
/// # Errors
///
/// 400 for a blank name or email, a malformed email, or an email in use.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<Value>, AppError> {
    let update = validation::profile_update(body)?;
    if update.email.as_deref().is_some_and(|e| !is_valid_email(e)) {
        return Err(AuthError::InvalidEmail.into());
    }

    let user = state
        .users
        .update_profile(caller.user.id, update, state.clock.now())
        .await?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(json!({ "message": "Profile updated successfully", "user": user })))
}

/// The caller's bookings, newest first.
///
/// # Errors
///
/// 401 without a live session.
pub async fn my_bookings(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .bookings
        .list_bookings(BookingQuery::for_user(caller.user.id))
        .await?;
    Ok(Json(bookings))
}

/// Events organized by the caller, newest first (organizer).
///
/// # Errors
///
/// 401 / 403 unless the caller is an organizer.
pub async fn my_events(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<Event>>, AppError> {
    require_role(&caller.actor, &[Role::Organizer])?;
    let events = state
        .events
        .list_events(EventQuery::organized_by(caller.user.id))
        .await?;
    Ok(Json(events))
}

/// Ticket analytics for each event the caller organizes (organizer).
///
/// # Errors
///
/// 401 / 403 unless the caller is an organizer.
pub async fn my_events_analytics(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<EventAnalytics>>, AppError> {
    require_role(&caller.actor, &[Role::Organizer])?;
    let events = state
        .events
        .list_events(EventQuery::organized_by(caller.user.id))
        .await?;

    let analytics = try_join_all(events.iter().map(|event| analytics_for(&state, event))).await?;
    Ok(Json(analytics))
}

/// One account by id (admin).
///
/// # Errors
///
/// 401 / 403 unless admin; 404 for an unknown id.
pub async fn get_user(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<User>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    Ok(Json(state.users.get_user(id).await?))
}

/// Changes an account's role (admin).
///
/// # Errors
///
/// 400 `"Invalid role"`; 401 / 403 unless admin; 404 for an unknown id.
pub async fn update_role(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    let role = Role::parse(&body.role)?;

    let user = state.users.update_role(id, role, state.clock.now()).await?;

    tracing::info!(user_id = %id, role = %role, admin = %caller.user.id, "Role updated");
    Ok(Json(json!({ "message": "User role updated successfully", "user": user })))
}

/// Deletes an account and signs out its sessions (admin).
///
/// The account's bookings are released and removed. Organizers must delete
/// their events first.
///
/// # Errors
///
/// 400 while the user organizes events; 401 / 403 unless admin; 404 for an
/// unknown id.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;

    state.users.delete_user(id).await?;
    let revoked = state.sessions.delete_user_sessions(id).await?;

    tracing::info!(user_id = %id, revoked, admin = %caller.user.id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
