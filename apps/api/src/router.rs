use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::json;

use availability_cell::router::availability_routes;
use booking_cell::router::{booking_routes, public_booking_routes};
use notification_cell::router::notification_routes;
use provider_cell::router::provider_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let configured = state.is_configured();

    Router::new()
        .route("/", get(|| async { "BookingDash API is running!" }))
        .route("/health", get(move || async move {
            Json(json!({
                "status": if configured { "ok" } else { "degraded" },
                "configured": configured
            }))
        }))
        .nest("/availability", availability_routes(state.clone()))
        .nest("/providers", provider_routes(state.clone()))
        .nest("/book", public_booking_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/notifications", notification_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_dashboard_routes_require_auth() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(Request::builder().uri("/bookings/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
