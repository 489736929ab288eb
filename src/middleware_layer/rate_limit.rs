use std::sync::Arc;

use axum::{response::IntoResponse, response::Response, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorError, GovernorLayer};

use crate::{error::AppError, state::AppState};

/// Seconds between replenished requests on the auth routes.
const AUTH_REPLENISH_SECS: u64 = 3;

/// Wraps `router` in a per-IP limiter.
///
/// Each client IP gets `burst` requests, refilled one every few seconds.
/// A `burst` of zero leaves the router untouched.
///
/// The key is the peer address, so the app must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn with_auth_rate_limit(router: Router<AppState>, burst: u32) -> Router<AppState> {
    if burst == 0 {
        return router;
    }

    let Some(config) = GovernorConfigBuilder::default()
        .per_second(AUTH_REPLENISH_SECS)
        .burst_size(burst)
        .use_headers()
        .finish()
    else {
        tracing::warn!("⚠️ Invalid auth rate limit settings, limiter disabled");
        return router;
    };

    tracing::info!(
        "✅ Auth rate limit: burst {} per IP, +1 every {}s",
        burst,
        AUTH_REPLENISH_SECS
    );

    router.layer(GovernorLayer::new(Arc::new(config)).error_handler(rejection_response))
}

/// Renders limiter rejections with the same `{"error": ...}` body as every
/// other failure, keeping the governor's rate-limit headers.
fn rejection_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::TooManyRequests(wait_time).into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("Rate limiter could not read the peer address".to_string())
                .into_response()
        }
        GovernorError::Other { code, msg, .. } => AppError::Internal(format!(
            "Rate limiter rejected request ({}): {}",
            code,
            msg.unwrap_or_default()
        ))
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn limited_requests_get_a_json_error() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("3"));

        let response = rejection_response(GovernorError::TooManyRequests {
            wait_time: 3,
            headers: Some(headers),
        });

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Too many requests, try again in 3s");
    }
}
