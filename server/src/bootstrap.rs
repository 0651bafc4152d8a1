//! Startup tasks that seed the database.

use crate::config::AdminConfig;
use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use ticketing_auth::password::{hash_password, validate_password};
use ticketing_auth::utils::{is_valid_email, normalize_email};
use ticketing_core::Role;
use ticketing_core::model::{NewUser, User};
use ticketing_core::store::UserRepository;

/// Creates the configured administrator unless its email is already taken.
///
/// Returns the new account, or `None` when one already exists.
///
/// # Errors
///
/// Fails on an invalid email or password, or when storage fails.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    admin: &AdminConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<User>> {
    let email = normalize_email(&admin.email);
    if !is_valid_email(&email) {
        bail!("ADMIN_EMAIL is not a valid email address");
    }
    validate_password(&admin.password).context("ADMIN_PASSWORD rejected")?;

    if users.find_credentials(email.clone()).await?.is_some() {
        tracing::debug!(%email, "Admin account already present");
        return Ok(None);
    }

    let password = admin.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;

    let user = users
        .create_user(
            NewUser {
                name: admin.name.trim().to_string(),
                email,
                password_hash,
                role: Role::Admin,
            },
            now,
        )
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
    Ok(Some(user))
}
