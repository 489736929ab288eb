use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// Extracts the credential from the `Authorization` header.
///
/// The value after the scheme is taken whatever the scheme is, so a
/// credential presented under `Token` or `Basic` still reaches verification
/// and is rejected there as invalid rather than missing.
///
/// # Returns
///
/// `None` when the header is absent, not UTF-8, or carries no credential.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (_scheme, token) = value.trim().split_once(' ')?;

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// A middleware that requires a valid bearer token.
///
/// No credential is `401`; one that fails verification is `403`. On success
/// the decoded claims are inserted into the request extensions. The user
/// table is not consulted.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        tracing::warn!("❌ No access token presented");
        AppError::MissingToken
    })?;

    let claims = state.tokens.verify(token).inspect_err(|_| {
        tracing::warn!("❌ Access token rejected");
    })?;

    tracing::debug!("✅ User authenticated: {}", claims.id);

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
