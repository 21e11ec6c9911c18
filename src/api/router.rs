use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes, Bearer token required when API_TOKEN is set
    let protected = Router::new()
        // Evaluator
        .route("/api/evaluate", post(handlers::evaluate::evaluate_proposal))
        .route("/api/plans", post(handlers::plans::create))
        // Journal records
        .route("/api/trades", get(handlers::trades::list))
        .route("/api/trades/count", get(handlers::trades::count))
        .route(
            "/api/trades/:id",
            get(handlers::trades::detail).delete(handlers::trades::remove),
        )
        .route("/api/trades/:id/execution", put(handlers::trades::update_execution))
        .route(
            "/api/trades/:id/executions",
            post(handlers::trades::add_execution),
        )
        .route(
            "/api/trades/:id/review",
            get(handlers::trades::get_review).put(handlers::trades::update_review),
        )
        // Analytics
        .route("/api/analytics/summary", get(handlers::analytics::summary))
        // Prices
        .route("/api/prices", get(handlers::prices::list))
        .route("/api/prices/:symbol", get(handlers::prices::latest))
        // Config
        .route(
            "/api/config",
            get(handlers::config::get_config).put(handlers::config::update_config),
        )
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
