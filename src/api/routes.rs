use crate::api::{handlers, AppState};
use crate::realtime::ws_handler;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and observability
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Issue lifecycle
        .route("/v1/issues", post(handlers::submit_issue))
        .route("/v1/issues", get(handlers::list_issues))
        .route("/v1/issues/reclassify", post(handlers::reclassify_issues))
        .route("/v1/issues/:id", get(handlers::get_issue))
        .route("/v1/issues/:id/status", put(handlers::update_status))
        .route("/v1/issues/:id/resolve", post(handlers::resolve_issue))
        .route("/v1/issues/:id/upvote", post(handlers::toggle_upvote))
        .route("/v1/issues/:id/comments", post(handlers::add_comment))
        // Analytics
        .route("/v1/analytics/summary", get(handlers::analytics_summary))
        .route("/v1/analytics/daily", get(handlers::analytics_daily))
        .route("/v1/analytics/heatmap", get(handlers::analytics_heatmap))
        // Realtime event stream
        .route("/ws", get(ws_handler))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
