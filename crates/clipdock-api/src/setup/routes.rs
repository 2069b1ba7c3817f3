//! Route configuration and setup.

use crate::auth::{auth_middleware, AuthState};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use clipdock_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

// Slack for multipart boundaries and headers on top of the payload cap.
// The exact per-file limit is enforced while reading the field.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt_secret: config.jwt_secret().to_string(),
    });

    let thumbnail_body_limit =
        config.max_thumbnail_bytes() as usize + MULTIPART_OVERHEAD_BYTES;
    let video_body_limit = config.max_video_bytes() as usize + MULTIPART_OVERHEAD_BYTES;

    let thumbnail_routes = Router::new()
        .route(
            "/videos/{video_id}/thumbnail",
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
        .layer(RequestBodyLimitLayer::new(thumbnail_body_limit))
        .layer(DefaultBodyLimit::max(thumbnail_body_limit));

    let video_routes = Router::new()
        .route(
            "/videos/{video_id}/media",
            post(handlers::video_upload::upload_video),
        )
        .layer(RequestBodyLimitLayer::new(video_body_limit))
        .layer(DefaultBodyLimit::max(video_body_limit));

    let protected_routes = thumbnail_routes.merge(video_routes).layer(
        axum::middleware::from_fn_with_state(auth_state, auth_middleware),
    );

    let public_routes = Router::new().route(
        "/videos/{video_id}/raw",
        get(handlers::media_raw::get_raw_media),
    );

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(API_PREFIX, protected_routes.merge(public_routes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
