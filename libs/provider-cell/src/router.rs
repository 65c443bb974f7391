use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn provider_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/{username}", get(handlers::get_public_page));

    let protected_routes = Router::new()
        .route("/me/profile", get(handlers::get_my_profile).put(handlers::update_my_profile))
        .route("/me/services", get(handlers::list_my_services).post(handlers::create_service))
        .route(
            "/me/services/{service_id}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
