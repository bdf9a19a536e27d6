use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{request_id_middleware, request_span};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users
        .route("/users/:user_id/similar", get(handlers::similar_users))
        .route("/users/:user_id/preferences", get(handlers::user_preferences))
        .route(
            "/users/:user_id/recommendations",
            get(handlers::recommendations),
        )
        // Items
        .route("/items/:item_id/similar", get(handlers::similar_items))
        .with_state(state)
        // Outermost first: the request ID must exist before the trace span is built
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(CorsLayer::permissive()),
        )
}
