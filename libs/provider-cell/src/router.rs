use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn provider_routes(state: Arc<AppConfig>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/search", get(handlers::search_providers))
        .route("/{provider_id}", get(handlers::get_provider))
        .route("/{provider_id}/services", get(handlers::list_services))
        .route(
            "/{provider_id}/services/{service_id}",
            get(handlers::get_service),
        )
        .route("/{provider_id}/reviews", get(handlers::list_reviews));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/", post(handlers::create_provider))
        .route("/{provider_id}", put(handlers::update_provider))
        .route("/{provider_id}/services", post(handlers::create_service))
        .route("/{provider_id}/reviews", post(handlers::create_review))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
