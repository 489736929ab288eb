use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers, middleware_layer, services::uploads::UPLOADS_URL_PREFIX, state::AppState,
};

/// Builds the API router with every endpoint and its auth requirements.
///
/// Static file serving, CORS and tracing are added by [`app`].
pub fn api_router(state: AppState) -> Router {
    let auth_routes = middleware_layer::rate_limit::with_auth_rate_limit(
        Router::new()
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login)),
        state.config.auth_rate_limit_burst,
    );

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/travels", get(handlers::travels::list_travels))
        .route("/api/travels/{travel_id}", get(handlers::travels::get_travel));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(handlers::auth::profile))
        .route("/api/travels", post(handlers::travels::create_travel))
        .route("/api/travels/my", get(handlers::travels::list_my_travels))
        .route(
            "/api/travels/{travel_id}",
            axum::routing::put(handlers::travels::update_travel)
                .delete(handlers::travels::delete_travel),
        )
        .route(
            "/api/upload-image",
            post(handlers::uploads::upload_image)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Builds the complete application: API, uploaded files, the single-page
/// client, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let spa = ServeDir::new(&config.static_dir)
        .fallback(ServeFile::new(config.static_dir.join("index.html")));

    api_router(state)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&config.upload_dir))
        .fallback_service(spa)
        .layer(cors_layer(&config.cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400))
}
