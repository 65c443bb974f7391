use tracing::{debug, warn};

use shared_models::booking::BookingStatus;

use crate::error::BookingError;

pub struct BookingLifecycleService;

impl Default for BookingLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current: BookingStatus,
        next: BookingStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current, next);

        if !current.can_transition_to(next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(BookingError::InvalidTransition { from: current, to: next });
        }

        Ok(())
    }

    /// Status for a booking made through the public page.
    pub fn initial_status(&self) -> BookingStatus {
        BookingStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_from_any_live_state() {
        let lifecycle = BookingLifecycleService::new();
        assert!(lifecycle.validate_status_transition(BookingStatus::Pending, BookingStatus::Cancelled).is_ok());
        assert!(lifecycle.validate_status_transition(BookingStatus::Confirmed, BookingStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_cancelled_cannot_be_revived() {
        let lifecycle = BookingLifecycleService::new();
        let result = lifecycle.validate_status_transition(BookingStatus::Cancelled, BookingStatus::Confirmed);
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { from: BookingStatus::Cancelled, to: BookingStatus::Confirmed })
        ));
    }

    #[test]
    fn test_same_status_is_not_a_transition() {
        let lifecycle = BookingLifecycleService::new();
        assert!(lifecycle.validate_status_transition(BookingStatus::Pending, BookingStatus::Pending).is_err());
    }
}
