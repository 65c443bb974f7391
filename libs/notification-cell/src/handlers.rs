use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::provider_id;

use crate::models::{BookingDetails, NotifyRequest};
use crate::services::BookingNotifier;

async fn owned_details(
    notifier: &BookingNotifier,
    user: &User,
    request: &NotifyRequest,
) -> Result<BookingDetails, AppError> {
    let details = notifier.load_details(request.booking_id).await?;

    if details.provider_id != provider_id(user)? {
        return Err(AppError::Forbidden("Not authorized to notify for this booking".to_string()));
    }

    Ok(details)
}

#[axum::debug_handler]
pub async fn send_email(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<Value>, AppError> {
    let notifier = BookingNotifier::new(&state, Some(auth.token()));
    let details = owned_details(&notifier, &user, &request).await?;

    let message_id = notifier.send_email(&details).await?;

    Ok(Json(json!({
        "success": true,
        "message_id": message_id
    })))
}

#[axum::debug_handler]
pub async fn send_sms(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<Value>, AppError> {
    let notifier = BookingNotifier::new(&state, Some(auth.token()));
    let details = owned_details(&notifier, &user, &request).await?;

    let message_id = notifier.send_sms(&details).await?;

    Ok(Json(json!({
        "success": true,
        "message_id": message_id
    })))
}
