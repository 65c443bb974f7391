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

use crate::models::{CreateServiceRequest, UpdateProfileRequest, UpdateServiceRequest};
use crate::services::{CatalogService, ProfileService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

/// Everything the public booking page shows before a slot is picked.
#[axum::debug_handler]
pub async fn get_public_page(
    State(state): State<Arc<AppConfig>>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state, None)
        .get_profile_by_username(&username)
        .await?;

    let services = CatalogService::new(&state, None)
        .list_services(profile.id)
        .await?;

    Ok(Json(json!({
        "provider": {
            "id": profile.id,
            "username": profile.username,
            "full_name": profile.full_name,
            "avatar_url": profile.avatar_url,
            "about": profile.about,
        },
        "services": services,
    })))
}

// ==============================================================================
// PROFILE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state, Some(auth.token()))
        .get_profile(provider_id(&user)?)
        .await?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_my_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state, Some(auth.token()))
        .update_profile(provider_id(&user)?, request)
        .await?;

    Ok(Json(json!(profile)))
}

// ==============================================================================
// SERVICE CATALOG HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_my_services(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let services = CatalogService::new(&state, Some(auth.token()))
        .list_services(provider_id(&user)?)
        .await?;

    Ok(Json(json!({
        "services": services,
        "total": services.len()
    })))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state, Some(auth.token()))
        .create_service(provider_id(&user)?, request)
        .await?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state, Some(auth.token()))
        .update_service(provider_id(&user)?, service_id, request)
        .await?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    CatalogService::new(&state, Some(auth.token()))
        .delete_service(provider_id(&user)?, service_id)
        .await?;

    Ok(Json(json!({
        "deleted": true,
        "service_id": service_id
    })))
}
