use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use availability_cell::AvailabilityError;
use shared_database::supabase::{is_conflict, SupabaseClient};
use shared_models::booking::BookingStatus;

use crate::error::BookingError;
use crate::models::{Booking, BookingFilter, NewBooking};

/// Persistence for bookings.
///
/// `insert` is the authoritative double-booking guard: implementations must
/// reject a second non-cancelled booking for the same provider and start time
/// with `AvailabilityError::DoubleBooked`, even when both requests passed
/// validation concurrently.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn bookings_on_date(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>>;

    async fn insert(&self, booking: NewBooking) -> Result<Booking, BookingError>;

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>>;

    async fn list_for_provider(&self, provider_id: Uuid, filter: &BookingFilter) -> Result<Vec<Booking>>;

    async fn update_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<Booking>;
}

fn day_start(date: NaiveDate) -> String {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    urlencoding::encode(&start.to_rfc3339()).into_owned()
}

/// Backed by the `bookings` table, which carries a partial unique index on
/// `(provider_id, booking_datetime) WHERE status <> 'cancelled'`.
pub struct SupabaseBookingStore {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseBookingStore {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn bookings_on_date(&self, provider_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        debug!("Fetching bookings for provider {} on {}", provider_id, date);

        let path = format!(
            "/rest/v1/bookings?provider_id=eq.{}&booking_datetime=gte.{}&booking_datetime=lt.{}&order=booking_datetime.asc",
            provider_id,
            day_start(date),
            day_start(date + Duration::days(1)),
        );

        self.supabase.request(Method::GET, &path, self.auth_token.as_deref(), None).await
    }

    async fn insert(&self, booking: NewBooking) -> Result<Booking, BookingError> {
        debug!("Inserting booking for provider {} at {}", booking.provider_id, booking.booking_datetime);

        let result: Result<Vec<Booking>> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/bookings",
            self.auth_token.as_deref(),
            Some(json!(booking)),
            Some(SupabaseClient::representation_headers()),
        ).await;

        match result {
            Ok(rows) => rows.into_iter().next()
                .ok_or_else(|| BookingError::Database("Insert returned no rows".to_string())),
            Err(e) if is_conflict(&e) => {
                warn!("Slot {} already taken for provider {}", booking.booking_datetime, booking.provider_id);
                Err(AvailabilityError::DoubleBooked.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        debug!("Fetching booking {}", booking_id);

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let rows: Vec<Booking> = self.supabase
            .request(Method::GET, &path, self.auth_token.as_deref(), None)
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn list_for_provider(&self, provider_id: Uuid, filter: &BookingFilter) -> Result<Vec<Booking>> {
        debug!("Listing bookings for provider {}", provider_id);

        let mut path = format!("/rest/v1/bookings?provider_id=eq.{}", provider_id);

        if let Some(status) = filter.status {
            path.push_str(&format!("&status=eq.{}", status));
        }
        if let Some(from) = filter.from {
            path.push_str(&format!("&booking_datetime=gte.{}", day_start(from)));
        }
        if let Some(to) = filter.to {
            path.push_str(&format!("&booking_datetime=lt.{}", day_start(to + Duration::days(1))));
        }
        path.push_str("&order=booking_datetime.asc");

        self.supabase.request(Method::GET, &path, self.auth_token.as_deref(), None).await
    }

    async fn update_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<Booking> {
        debug!("Setting booking {} status to {}", booking_id, status);

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let rows: Vec<Booking> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            self.auth_token.as_deref(),
            Some(json!({ "status": status })),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        rows.into_iter().next()
            .ok_or_else(|| anyhow::anyhow!("Booking {} not found", booking_id))
    }
}
