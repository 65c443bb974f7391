use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use availability_cell::models::{hhmm, BookedInterval};
use notification_cell::NotificationReport;
use shared_models::booking::BookingStatus;

use crate::error::BookingError;

// ==============================================================================
// BOOKINGS
// ==============================================================================

/// A persisted booking. Duration and price are copies taken from the service
/// when the booking was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(rename = "phone_number", default)]
    pub customer_phone: Option<String>,
    pub booking_datetime: DateTime<Utc>,
    pub duration: i32,
    pub price: i64,
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.booking_datetime, self.duration, self.status)
    }
}

/// Insert payload for the `bookings` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBooking {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(rename = "phone_number")]
    pub customer_phone: Option<String>,
    pub booking_datetime: DateTime<Utc>,
    pub duration: i32,
    pub price: i64,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.customer_name.trim().is_empty() {
            return Err(BookingError::Validation("Customer name is required".to_string()));
        }

        if !is_valid_email(self.customer_email.trim()) {
            return Err(BookingError::Validation("A valid customer email is required".to_string()));
        }

        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    email.len() <= 254
        && Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .map(|re| re.is_match(email))
            .unwrap_or(false)
}

/// Response to a public booking. `notifications` is absent when dispatch
/// itself failed; the booking stands either way.
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub notifications: Option<NotificationReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub service_id: Uuid,
    pub date: NaiveDate,
}

// ==============================================================================
// DASHBOARD METRICS
// ==============================================================================

pub const TREND_WEEKS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrendPoint {
    pub week_start: NaiveDate,
    pub bookings: usize,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_bookings: usize,
    pub unique_customers_this_month: usize,
    pub avg_duration_minutes: i64,
    pub total_revenue: i64,
    pub weekly_trend: Vec<WeeklyTrendPoint>,
}
