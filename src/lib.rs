pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod services;
pub mod state;
pub mod validation;
pub mod workers;

pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::models::media::{DEFAULT_MAX_IMAGE_BYTES, QUOTE_MAX_IMAGE_BYTES};

/// Room left in a multipart body for the text fields around the image.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

fn form_limit(max_image_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_image_bytes + FORM_OVERHEAD_BYTES)
}

/// Builds the CORS layer; `*` allows any origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin.trim())
        .map_err(|e| Error::Internal(format!("Invalid CORS origin '{}': {}", origin, e)))?;
    Ok(layer.allow_origin(origin))
}

/// All `/api` routes. Administration routes sit behind the bearer-token gate.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handlers::api_info))
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(handlers::login))
        .route(
            "/participants",
            post(handlers::submit_participation).layer(form_limit(DEFAULT_MAX_IMAGE_BYTES)),
        )
        .route("/partners", get(handlers::list_partners))
        .route("/partners/{id}", get(handlers::get_partner))
        .route(
            "/quotes",
            post(handlers::submit_quote).layer(form_limit(QUOTE_MAX_IMAGE_BYTES)),
        );

    let protected = Router::new()
        .route("/auth/profile", get(handlers::profile))
        .route("/auth/verify", get(handlers::verify))
        .route("/participants", get(handlers::list_participants))
        .route(
            "/participants/{id}",
            get(handlers::get_participant).delete(handlers::delete_participant),
        )
        .route(
            "/participants/{id}/select",
            patch(handlers::toggle_participant_selection),
        )
        .route(
            "/participants/{id}/status",
            patch(handlers::update_participant_status),
        )
        .route(
            "/partners",
            post(handlers::create_partner).layer(form_limit(DEFAULT_MAX_IMAGE_BYTES)),
        )
        .route(
            "/partners/{id}",
            put(handlers::update_partner)
                .layer(form_limit(DEFAULT_MAX_IMAGE_BYTES))
                .delete(handlers::delete_partner),
        )
        .route("/quotes", get(handlers::list_quotes))
        .route(
            "/quotes/{id}",
            get(handlers::get_quote).delete(handlers::delete_quote),
        )
        .route("/quotes/{id}/status", patch(handlers::update_quote_status))
        .route(
            "/upload",
            post(handlers::upload_image)
                .layer(form_limit(DEFAULT_MAX_IMAGE_BYTES))
                .delete(handlers::delete_image),
        )
        .route_layer(from_fn_with_state(
            state,
            middleware::jwt_auth_middleware,
        ));

    public.merge(protected)
}

/// Complete application router with request ids, tracing and CORS.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .with_state(state)
}
