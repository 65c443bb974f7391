use thiserror::Error;

use availability_cell::AvailabilityError;
use notification_cell::NotificationError;
use provider_cell::ProviderError;
use shared_models::booking::BookingStatus;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("This provider does not offer the requested service")]
    ServiceNotOffered,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        BookingError::Database(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Availability(e) => e.into(),
            BookingError::Provider(e) => e.into(),
            BookingError::Notification(e) => e.into(),
            BookingError::ServiceNotOffered | BookingError::BookingNotFound => {
                AppError::NotFound(err.to_string())
            }
            BookingError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::Database(msg) => AppError::Database(msg),
        }
    }
}
