use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Email delivery is not configured")]
    EmailNotConfigured,

    #[error("SMS delivery is not configured: {0}")]
    SmsNotConfigured(String),

    #[error("SMS delivery is temporarily unavailable: {0}")]
    SmsUnavailable(String),

    #[error("Delivery provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for NotificationError {
    fn from(err: anyhow::Error) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Upstream(err.to_string())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::BookingNotFound => AppError::NotFound(err.to_string()),
            NotificationError::InvalidPhoneNumber(_) => AppError::BadRequest(err.to_string()),
            NotificationError::EmailNotConfigured | NotificationError::SmsNotConfigured(_) => {
                AppError::Internal(err.to_string())
            }
            NotificationError::SmsUnavailable(_) => AppError::Unavailable(err.to_string()),
            NotificationError::Upstream(_) => AppError::ExternalService(err.to_string()),
            NotificationError::Database(msg) => AppError::Database(msg),
        }
    }
}
