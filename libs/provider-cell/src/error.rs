use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not found")]
    ProfileNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized to modify this service")]
    NotOwner,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        ProviderError::Database(err.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ProfileNotFound | ProviderError::ServiceNotFound => {
                AppError::NotFound(err.to_string())
            }
            ProviderError::InvalidUsername(_) | ProviderError::Validation(_) => {
                AppError::ValidationError(err.to_string())
            }
            ProviderError::UsernameTaken => AppError::Conflict(err.to_string()),
            ProviderError::NotOwner => AppError::Forbidden(err.to_string()),
            ProviderError::Database(msg) => AppError::Database(msg),
        }
    }
}
