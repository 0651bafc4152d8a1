//! Event endpoints under `/events`.
//!
//! The public listing shows approved events; admins see every status.
//! Organizers manage their own events and any change sends an event back
//! to `pending` for review.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, OptionalSessionUser, SessionUser};
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ticketing_core::access::{can_view_event, ensure_event_owner, require_role};
use ticketing_core::inventory::{self, TicketStats};
use ticketing_core::model::{Event, EventQuery, EventUpdate, NewEvent};
use ticketing_core::types::{EventId, EventStatus, Role};
use ticketing_core::{DomainError, StoreError, validation};

/// Query string of `GET /events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    /// Category, case-insensitive
    pub category: Option<String>,
    /// Substring of title, description or location
    pub search: Option<String>,
    /// Status filter; honoured for admins only
    pub status: Option<String>,
}

/// `POST /events` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event title
    #[serde(default)]
    pub title: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// When the event takes place
    pub date: Option<DateTime<Utc>>,
    /// Venue
    #[serde(default)]
    pub location: String,
    /// Ticket price
    pub price: Option<f64>,
    /// Capacity
    pub total_tickets: Option<i32>,
    /// Category
    #[serde(default)]
    pub category: String,
    /// Image URL
    #[serde(default)]
    pub image: String,
}

/// `PUT /events/:id/status` body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// `approved`, `pending` or `declined`
    #[serde(default)]
    pub status: String,
}

/// Booking figures for one event, as listed for its organizer.
#[derive(Debug, Serialize)]
pub struct EventAnalytics {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Ticket figures
    #[serde(flatten)]
    pub stats: TicketStats,
}

/// Identifies the event in `GET /events/:id/analytics`.
#[derive(Debug, Serialize)]
pub struct EventRef {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
}

/// `GET /events/:id/analytics` response.
#[derive(Debug, Serialize)]
pub struct EventAnalyticsResponse {
    /// The event
    pub event: EventRef,
    /// Ticket figures
    #[serde(flatten)]
    pub stats: TicketStats,
}

/// Computes analytics for an event.
pub(crate) async fn analytics_for(
    state: &AppState,
    event: &Event,
) -> Result<EventAnalytics, AppError> {
    let confirmed = state.events.count_confirmed_bookings(event.id).await?;
    Ok(EventAnalytics {
        id: event.id,
        title: event.title.clone(),
        stats: inventory::stats(event, confirmed),
    })
}

/// Loads an event the caller organizes.
async fn owned_event(
    state: &AppState,
    caller: &SessionUser,
    id: EventId,
    action: &str,
) -> Result<Event, AppError> {
    require_role(&caller.actor, &[Role::Organizer])?;
    let event = state.events.get_event(id).await?;
    ensure_event_owner(&caller.actor, &event, action)?;
    Ok(event)
}

fn missing(field: &str) -> DomainError {
    DomainError::Validation(format!("Please provide {field}"))
}

/// Public event listing, soonest first.
///
/// # Errors
///
/// 400 for an unknown `status` value.
pub async fn list_events(
    State(state): State<AppState>,
    caller: OptionalSessionUser,
    ApiQuery(params): ApiQuery<ListEventsParams>,
) -> Result<Json<Vec<Event>>, AppError> {
    let is_admin = caller.actor().is_some_and(|actor| actor.is_admin());

    let mut query = if is_admin {
        EventQuery {
            status: params.status.as_deref().map(EventStatus::parse).transpose()?,
            ..EventQuery::default()
        }
    } else {
        EventQuery::approved()
    };
    query.category = params.category.filter(|c| !c.trim().is_empty());
    query.search = params.search.filter(|s| !s.trim().is_empty());

    Ok(Json(state.events.list_events(query).await?))
}

/// Events awaiting approval, newest first (admin).
///
/// # Errors
///
/// 401 / 403 unless admin.
pub async fn pending_events(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<Event>>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    Ok(Json(state.events.list_events(EventQuery::pending()).await?))
}

/// One event. Unapproved events are visible to their organizer and admins
/// only; everyone else gets 404.
///
/// # Errors
///
/// 404 for an unknown or hidden event.
pub async fn get_event(
    State(state): State<AppState>,
    caller: OptionalSessionUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.get_event(id).await?;
    if !can_view_event(caller.actor(), &event) {
        return Err(StoreError::event_not_found().into());
    }
    Ok(Json(event))
}

/// Submits a new event for approval (organizer).
///
/// # Errors
///
/// 400 for missing or invalid fields; 401 / 403 unless organizer.
pub async fn create_event(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiJson(body): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&caller.actor, &[Role::Organizer])?;

    let draft = validation::new_event(NewEvent {
        title: body.title,
        description: body.description,
        date: body.date.ok_or_else(|| missing("a date"))?,
        location: body.location,
        price: body.price.ok_or_else(|| missing("a price"))?,
        total_tickets: body.total_tickets.ok_or_else(|| missing("total tickets"))?,
        category: body.category,
        image: body.image,
        organizer: caller.user.id,
    })?;

    let event = state.events.create_event(draft, state.clock.now()).await?;

    metrics::event_created();
    tracing::info!(event_id = %event.id, organizer = %caller.user.id, "Event submitted");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created successfully and pending admin approval",
            "event": event,
        })),
    ))
}

/// Edits an event the caller organizes and sends it back for approval.
///
/// # Errors
///
/// 400 for invalid fields or a capacity below the tickets already booked;
/// 401 / 403 unless the owning organizer; 404 for an unknown event.
pub async fn update_event(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<EventId>,
    ApiJson(body): ApiJson<EventUpdate>,
) -> Result<Json<Value>, AppError> {
    owned_event(&state, &caller, id, "update this event").await?;
    let update = validation::event_update(body)?;

    let event = state
        .events
        .update_event(id, update, state.clock.now())
        .await?;

    Ok(Json(json!({
        "message": "Event updated successfully and pending admin approval",
        "event": event,
    })))
}

/// Deletes an event the caller organizes.
///
/// # Errors
///
/// 400 while confirmed bookings exist; 401 / 403 unless the owning
/// organizer; 404 for an unknown event.
pub async fn delete_event(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Value>, AppError> {
    owned_event(&state, &caller, id, "delete this event").await?;
    state.events.delete_event(id).await?;
    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

/// Ticket analytics for an event the caller organizes.
///
/// # Errors
///
/// 401 / 403 unless the owning organizer; 404 for an unknown event.
pub async fn event_analytics(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<EventAnalyticsResponse>, AppError> {
    let event = owned_event(&state, &caller, id, "view analytics for this event").await?;
    let analytics = analytics_for(&state, &event).await?;

    Ok(Json(EventAnalyticsResponse {
        event: EventRef {
            id: analytics.id,
            title: analytics.title,
        },
        stats: analytics.stats,
    }))
}

/// Approves, declines or re-queues an event (admin).
///
/// # Errors
///
/// 400 `"Invalid status value"`; 401 / 403 unless admin; 404 for an
/// unknown event.
pub async fn set_status(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<EventId>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    let status = EventStatus::parse(&body.status)?;

    let event = state.events.set_status(id, status, state.clock.now()).await?;

    metrics::event_status_changed(status.as_str());
    tracing::info!(event_id = %id, status = %status, admin = %caller.user.id, "Event reviewed");
    Ok(Json(json!({
        "message": format!("Event {status} successfully"),
        "event": event,
    })))
}
