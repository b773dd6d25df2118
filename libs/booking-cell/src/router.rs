use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new().route(
        "/availability/{provider_id}",
        get(handlers::get_available_slots),
    );

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/", post(handlers::create_booking))
        .route("/me", get(handlers::list_my_bookings))
        .route("/{booking_id}/cancel", patch(handlers::cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
