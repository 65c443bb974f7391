use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Requested time is outside the provider's availability")]
    OutsideAvailability,

    #[error("Requested time overlaps an existing booking")]
    DoubleBooked,

    #[error("Requested time is in the past")]
    PastDateTime,

    #[error("Invalid availability configuration: {0}")]
    InvalidAvailabilityConfig(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AvailabilityError {
    fn from(err: anyhow::Error) -> Self {
        AvailabilityError::Database(err.to_string())
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::OutsideAvailability | AvailabilityError::PastDateTime => {
                AppError::BadRequest(err.to_string())
            }
            AvailabilityError::DoubleBooked => AppError::Conflict(err.to_string()),
            AvailabilityError::InvalidAvailabilityConfig(msg) => AppError::ValidationError(msg),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        }
    }
}
