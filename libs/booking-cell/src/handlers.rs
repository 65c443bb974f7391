use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::provider_id;

use crate::models::{BookingFilter, CreateBookingRequest, SlotsQuery, UpdateStatusRequest};
use crate::services::BookingService;

// ==============================================================================
// PUBLIC BOOKING PAGE
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(username): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, None);

    let slots = booking_service
        .available_slots(&username, query.service_id, query.date, Utc::now())
        .await?;

    Ok(Json(json!({
        "username": username,
        "service_id": query.service_id,
        "date": query.date,
        "available_slots": slots,
        "total_slots": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    Path(username): Path<String>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, None);

    let receipt = booking_service
        .create_booking(&username, request, Utc::now())
        .await?;

    Ok(Json(json!(receipt)))
}

// ==============================================================================
// PROVIDER DASHBOARD
// ==============================================================================

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Value>, AppError> {
    let bookings = BookingService::new(&state, Some(auth.token()))
        .list_bookings(provider_id(&user)?, filter)
        .await?;

    Ok(Json(json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state, Some(auth.token()))
        .get_booking(provider_id(&user)?, booking_id)
        .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state, Some(auth.token()))
        .update_status(provider_id(&user)?, booking_id, request.status)
        .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state, Some(auth.token()))
        .cancel_booking(provider_id(&user)?, booking_id)
        .await?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn resend_notifications(
    State(state): State<Arc<AppConfig>>,
    Path(booking_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let report = BookingService::new(&state, Some(auth.token()))
        .resend_notifications(provider_id(&user)?, booking_id)
        .await?;

    Ok(Json(json!({
        "booking_id": booking_id,
        "notifications": report
    })))
}

#[axum::debug_handler]
pub async fn get_metrics(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let metrics = BookingService::new(&state, Some(auth.token()))
        .metrics(provider_id(&user)?, Utc::now())
        .await?;

    Ok(Json(json!(metrics)))
}
