use axum::{
    extract::State,
    response::IntoResponse,
    Extension, Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{claims::Claims, user::UserDto},
    services::auth as auth_service,
    state::AppState,
    validation::{
        auth::non_blank,
        json::ValidatedJson,
    },
};

/// The request payload for user registration.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[garde(email, length(max = 255))]
    pub email: String,
    #[serde(default)]
    #[garde(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    #[garde(custom(non_blank), length(max = 255))]
    pub name: String,
}

/// The request payload for user login.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[garde(custom(non_blank))]
    pub email: String,
    #[serde(default)]
    #[garde(length(min = 1))]
    pub password: String,
}

/// The response payload for register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

/// The response payload for the profile endpoint.
#[derive(Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserDto,
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("📝 Register attempt for: {}", payload.email);

    let session =
        auth_service::register(&state, payload.email, payload.password, payload.name).await?;

    Ok(Json(AuthResponse {
        user: UserDto::identity(&session.user),
        token: session.token,
    }))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let session = auth_service::login(&state, payload.email, payload.password).await?;

    Ok(Json(AuthResponse {
        user: UserDto::identity(&session.user),
        token: session.token,
    }))
}

/// Returns the profile of the token's user.
#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = auth_service::profile(&state, claims.id).await?;

    Ok(Json(ProfileResponse {
        user: UserDto::profile(&user),
    }))
}
