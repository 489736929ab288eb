use uuid::Uuid;

use crate::crypto::password;
use crate::error::{AppError, Result};
use crate::models::user::{NewUser, User};
use crate::state::AppState;

/// A user together with a freshly issued token.
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Registers a new user and signs them in.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The login key. Stored exactly as given.
/// * `password` - The plaintext password.
/// * `name` - The display name.
///
/// # Returns
///
/// A `Result` containing the new user and their token, or
/// `AppError::Conflict` if the email is taken.
pub async fn register(
    state: &AppState,
    email: String,
    password: String,
    name: String,
) -> Result<Authenticated> {
    tracing::debug!("🔐 Creating user: {}", email);

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password_blocking(password).await?;

    // The unique index still guards against a concurrent registration.
    let user = state
        .users
        .create(NewUser {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name: name.trim().to_string(),
        })
        .await?;

    let token = state.tokens.issue(&user)?;
    tracing::info!("✅ User created with ID: {}", user.id);

    Ok(Authenticated { user, token })
}

/// Authenticates a user by email and password.
///
/// An unknown email and a wrong password produce the same
/// `AppError::InvalidCredentials`.
pub async fn login(state: &AppState, email: String, password: String) -> Result<Authenticated> {
    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password_blocking(password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user)?;
    tracing::info!("✅ User authenticated: {}", user.id);

    Ok(Authenticated { user, token })
}

/// Loads the stored profile behind a verified token.
pub async fn profile(state: &AppState, user_id: Uuid) -> Result<User> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
