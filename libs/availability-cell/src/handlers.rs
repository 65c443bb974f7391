use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::provider_id;

use crate::models::{AvailabilityPatch, ReplaceAvailabilityRequest, WeeklyAvailability};
use crate::services::AvailabilityService;

fn availability_body(weekly: &WeeklyAvailability) -> Value {
    json!({
        "availability": weekly,
        "available_weekdays": weekly.available_weekdays(),
        "weekdays": weekly.weekday_summaries(),
    })
}

fn ensure_owner(user: &User, owner_id: Uuid) -> Result<(), AppError> {
    if provider_id(user)? != owner_id {
        return Err(AppError::Forbidden(
            "Not authorized to change availability for this provider".to_string(),
        ));
    }
    Ok(())
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state, None);

    let weekly = service.get_availability(provider_id).await?;

    Ok(Json(availability_body(&weekly)))
}

// ==============================================================================
// PROVIDER HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn replace_availability(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<ReplaceAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_owner(&user, provider_id)?;

    let service = AvailabilityService::new(&state, Some(auth.token()));
    let weekly = service.replace_availability(provider_id, request.days).await?;

    Ok(Json(availability_body(&weekly)))
}

#[axum::debug_handler]
pub async fn update_day(
    State(state): State<Arc<AppConfig>>,
    Path((provider_id, weekday)): Path<(Uuid, u8)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(patch): Json<AvailabilityPatch>,
) -> Result<Json<Value>, AppError> {
    ensure_owner(&user, provider_id)?;

    let service = AvailabilityService::new(&state, Some(auth.token()));
    let weekly = service.update_availability(provider_id, weekday, patch).await?;

    Ok(Json(availability_body(&weekly)))
}
