//! HTTP API for the event ticketing service.
//!
//! An axum shell around `ticketing-core`: handlers parse the request, resolve
//! the caller, run the access and inventory rules through the repositories
//! and map the outcome to JSON.
//!
//! # Request Flow
//!
//! 1. **Correlation id** assigned by [`correlation_id_layer`]
//! 2. **Caller** resolved from the bearer token by [`SessionUser`]
//! 3. **Access** checked with `ticketing_core::access`
//! 4. **Repository** call (inventory rules run inside the store's transaction)
//! 5. **Response** serialized, or [`AppError`] rendered as `{code, message}`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ticketing_web::{AppState, build_router};
//!
//! let state = AppState::new(store, Arc::new(sessions), Arc::new(SystemClock));
//! let app = build_router(state, &config.cors_allowed_origins);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{
    ApiJson, ApiPath, ApiQuery, BearerToken, ClientIp, CorrelationId, OptionalSessionUser,
    SessionUser, UserAgent,
};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::{API_PREFIX, build_router};
pub use state::{AppState, AuthSettings};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
