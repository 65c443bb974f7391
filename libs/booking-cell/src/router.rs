use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Customer-facing booking page, no authentication.
pub fn public_booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{username}", post(handlers::create_booking))
        .route("/{username}/slots", get(handlers::get_available_slots))
        .with_state(state)
}

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_bookings))
        .route("/metrics", get(handlers::get_metrics))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/status", patch(handlers::update_booking_status))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/{booking_id}/notify", post(handlers::resend_notifications))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
