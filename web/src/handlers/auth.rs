//! Registration, login, logout and password reset.
//!
//! Argon2 is CPU-bound, so hashing and verification run on the blocking pool.

use crate::error::AppError;
use crate::extractors::{ApiJson, ClientIp, SessionUser, UserAgent};
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ticketing_auth::password::{hash_password, validate_password, verify_password};
use ticketing_auth::utils::{is_valid_email, normalize_email};
use ticketing_auth::{AuthError, Session};
use ticketing_core::model::NewUser;
use ticketing_core::types::{Role, UserId};
use ticketing_core::{DomainError, validation};

/// `POST /register` body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Plain password
    #[serde(default)]
    pub password: String,
    /// `user` (default) or `organizer`
    pub role: Option<String>,
}

/// `POST /login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Plain password
    #[serde(default)]
    pub password: String,
}

/// `PUT /forgotPassword` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Replacement password
    #[serde(default)]
    pub new_password: String,
}

/// Account fields returned on login.
#[derive(Debug, Serialize)]
pub struct LoginUser {
    /// Account identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Current role
    pub role: Role,
}

/// `POST /login` response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Human-readable outcome
    pub message: &'static str,
    /// Bearer token for later requests
    pub token: String,
    /// The logged-in account
    pub user: LoginUser,
}

async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("Password task failed: {e}")))?
        .map_err(AppError::from)
}

fn checked_email(email: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail.into());
    }
    Ok(email)
}

/// Creates an account.
///
/// Only `user` and `organizer` can be chosen; admins are created by the
/// server bootstrap or promoted by another admin.
///
/// # Errors
///
/// - 400 for a blank name, invalid email, short password, unknown or admin
///   role, or an email already in use
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = validation::required("a name", &body.name)?;
    let email = checked_email(&body.email)?;
    validate_password(&body.password)?;
    let role = match body.role.as_deref() {
        None => Role::User,
        Some(role) => match Role::parse(role)? {
            Role::Admin => return Err(DomainError::InvalidRole.into()),
            role => role,
        },
    };

    let password = body.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create_user(
            NewUser {
                name,
                email,
                password_hash,
                role,
            },
            state.clock.now(),
        )
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    ))
}

/// Verifies credentials and opens a session.
///
/// # Errors
///
/// - 400 when email or password is missing
/// - 401 for unknown email or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    UserAgent(user_agent): UserAgent,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::bad_request("Please provide email and password"));
    }

    let Some(credentials) = state
        .users
        .find_credentials(normalize_email(&body.email))
        .await?
    else {
        metrics::login("unknown_email");
        return Err(AuthError::InvalidCredentials.into());
    };

    let password = body.password;
    let hash = credentials.password_hash;
    if !blocking(move || verify_password(&password, &hash)).await? {
        metrics::login("wrong_password");
        tracing::info!(user_id = %credentials.user.id, "Login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = credentials.user;
    let session = Session::start(
        user.id,
        user.email.clone(),
        user.role,
        state.clock.now(),
        state.auth.session_ttl,
    )
    .with_client(Some(ip), Some(user_agent));
    let token = session.session_id.to_string();
    state
        .sessions
        .create_session(session, state.auth.session_ttl)
        .await?;

    metrics::login("success");
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Replaces the password of the account with this email and signs out all of
/// its sessions.
///
/// # Errors
///
/// - 400 for an invalid email or short password
/// - 404 when no account uses the email
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let email = checked_email(&body.email)?;
    validate_password(&body.new_password)?;

    let password = body.new_password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .update_password(email, password_hash, state.clock.now())
        .await?;
    let revoked = state.sessions.delete_user_sessions(user.id).await?;

    tracing::info!(user_id = %user.id, revoked, "Password reset");
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

/// Ends the caller's session.
///
/// # Errors
///
/// - 401 without a live session
pub async fn logout(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Value>, AppError> {
    state
        .sessions
        .delete_session(caller.session.session_id)
        .await?;

    tracing::info!(user_id = %caller.user.id, "User logged out");
    Ok(Json(json!({ "message": "Logged out successfully" })))
}
