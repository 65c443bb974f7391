use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::models::{BookedInterval, SlotRequest, TimeSlot};
use availability_cell::services::{AvailabilityService, AvailabilityStore, SupabaseAvailabilityStore};
use notification_cell::{BookingNotifier, NotificationDispatcher, NotificationReport};
use provider_cell::{ProviderDirectory, SupabaseProviderDirectory};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::booking::BookingStatus;

use crate::error::BookingError;
use crate::models::{
    Booking, BookingFilter, BookingReceipt, CreateBookingRequest, DashboardMetrics, NewBooking,
};
use crate::services::lifecycle::BookingLifecycleService;
use crate::services::metrics::compute_metrics;
use crate::services::store::{BookingStore, SupabaseBookingStore};

pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    providers: Arc<dyn ProviderDirectory>,
    availability: AvailabilityService,
    notifier: Arc<dyn NotificationDispatcher>,
    lifecycle: BookingLifecycleService,
}

impl BookingService {
    /// Supabase-backed service. Without a token, calls run as the service
    /// role when one is configured.
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let token = auth_token.map(str::to_string);

        Self::with_components(
            Arc::new(SupabaseBookingStore::new(supabase.clone(), token.clone())),
            Arc::new(SupabaseProviderDirectory::new(config, auth_token)),
            Arc::new(SupabaseAvailabilityStore::new(supabase, token)),
            Arc::new(BookingNotifier::new(config, auth_token)),
        )
    }

    pub fn with_components(
        bookings: Arc<dyn BookingStore>,
        providers: Arc<dyn ProviderDirectory>,
        availability: Arc<dyn AvailabilityStore>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            bookings,
            providers,
            availability: AvailabilityService::with_store(availability),
            notifier,
            lifecycle: BookingLifecycleService::new(),
        }
    }

    async fn existing_intervals(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<BookedInterval>, BookingError> {
        let bookings = self.bookings.bookings_on_date(provider_id, date).await?;
        Ok(bookings.iter().map(Booking::interval).collect())
    }

    /// Open start times for one of a provider's services on `date`.
    pub async fn available_slots(
        &self,
        username: &str,
        service_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        let provider = self.providers.profile_by_username(username).await?;
        let service = self.providers.service(service_id).await?;
        if service.user_id != provider.id {
            return Err(BookingError::ServiceNotOffered);
        }

        let existing = self.existing_intervals(provider.id, date).await?;
        let slots = self.availability
            .slots_for_date(provider.id, date, service.duration, &existing, now)
            .await?;

        Ok(slots)
    }

    /// The public booking flow: validate against availability, persist, then
    /// notify. Notification failures are logged and never undo the booking.
    pub async fn create_booking(
        &self,
        username: &str,
        request: CreateBookingRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingReceipt, BookingError> {
        request.validate()?;

        let provider = self.providers.profile_by_username(username).await?;
        let service = self.providers.service(request.service_id).await?;
        if service.user_id != provider.id {
            return Err(BookingError::ServiceNotOffered);
        }

        let existing = self.existing_intervals(provider.id, request.date).await?;
        let slot_request = SlotRequest {
            date: request.date,
            time: request.time,
            service_id: service.id,
            duration_minutes: service.duration,
        };
        let slot = self.availability
            .validate_booking(provider.id, &slot_request, &existing, now)
            .await?;

        let new_booking = NewBooking {
            provider_id: provider.id,
            service_id: service.id,
            customer_name: request.customer_name.trim().to_string(),
            customer_email: request.customer_email.trim().to_string(),
            customer_phone: request.customer_phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            booking_datetime: slot.start,
            duration: service.duration,
            price: service.price,
            status: self.lifecycle.initial_status(),
            notes: request.notes.filter(|notes| !notes.trim().is_empty()),
        };

        let booking = self.bookings.insert(new_booking).await?;
        info!("Created booking {} for provider {} at {}", booking.id, provider.id, booking.booking_datetime);

        let notifications = match self.notifier.dispatch(booking.id).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Notifications for booking {} failed: {}", booking.id, e);
                None
            }
        };

        Ok(BookingReceipt { booking, notifications })
    }

    /// Bookings of other providers are reported as not found.
    pub async fn get_booking(&self, provider_id: Uuid, booking_id: Uuid) -> Result<Booking, BookingError> {
        debug!("Fetching booking {} for provider {}", booking_id, provider_id);

        self.bookings.get(booking_id).await?
            .filter(|booking| booking.provider_id == provider_id)
            .ok_or(BookingError::BookingNotFound)
    }

    pub async fn list_bookings(&self, provider_id: Uuid, filter: BookingFilter) -> Result<Vec<Booking>, BookingError> {
        let mut bookings = self.bookings.list_for_provider(provider_id, &filter).await?;
        bookings.sort_by_key(|booking| booking.booking_datetime);
        Ok(bookings)
    }

    pub async fn update_status(
        &self,
        provider_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.get_booking(provider_id, booking_id).await?;
        self.lifecycle.validate_status_transition(booking.status, status)?;

        let updated = self.bookings.update_status(booking_id, status).await?;
        info!("Booking {} moved from {} to {}", booking_id, booking.status, status);

        Ok(updated)
    }

    pub async fn cancel_booking(&self, provider_id: Uuid, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.update_status(provider_id, booking_id, BookingStatus::Cancelled).await
    }

    pub async fn resend_notifications(
        &self,
        provider_id: Uuid,
        booking_id: Uuid,
    ) -> Result<NotificationReport, BookingError> {
        let booking = self.get_booking(provider_id, booking_id).await?;
        let report = self.notifier.dispatch(booking.id).await?;
        Ok(report)
    }

    pub async fn metrics(&self, provider_id: Uuid, now: DateTime<Utc>) -> Result<DashboardMetrics, BookingError> {
        let bookings = self.bookings.list_for_provider(provider_id, &BookingFilter::default()).await?;
        Ok(compute_metrics(&bookings, now))
    }
}
