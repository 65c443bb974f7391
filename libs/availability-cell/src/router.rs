use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    // Read by the public booking page
    let public_routes = Router::new()
        .route("/{provider_id}", get(handlers::get_availability));

    let protected_routes = Router::new()
        .route("/{provider_id}", put(handlers::replace_availability))
        .route("/{provider_id}/days/{weekday}", patch(handlers::update_day))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
