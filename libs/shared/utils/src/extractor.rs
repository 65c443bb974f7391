use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Rejects requests without a valid bearer token and stores the caller as a `User` extension.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_value = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    if user.is_anonymous() {
        return Err(AppError::Auth("Provider sign-in required".to_string()));
    }

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// The signed-in provider's id. Provider-owned rows are keyed by the auth user id.
pub fn provider_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestUser;

    #[test]
    fn test_provider_id_parses_subject() {
        let user = TestUser::provider("owner@example.com");
        assert_eq!(provider_id(&user.to_user()).unwrap().to_string(), user.id);
    }

    #[test]
    fn test_provider_id_rejects_non_uuid_subject() {
        let mut user = TestUser::provider("owner@example.com").to_user();
        user.id = "service-account".to_string();
        assert!(matches!(provider_id(&user), Err(AppError::Auth(_))));
    }
}
