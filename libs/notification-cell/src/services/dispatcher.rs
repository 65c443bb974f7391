use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::NotificationError;
use crate::models::{BookingDetails, BookingRow, DeliveryOutcome, NotificationReport, ProviderName};
use crate::services::{EmailClient, SmsClient};
use crate::templates::{email_html, sms_body, EMAIL_SUBJECT};

/// Sends confirmations for a persisted booking. Callers treat failures as
/// best-effort: a failed notification never undoes the booking.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, booking_id: Uuid) -> Result<NotificationReport, NotificationError>;
}

pub struct BookingNotifier {
    supabase: SupabaseClient,
    auth_token: Option<String>,
    email: EmailClient,
    sms: SmsClient,
}

impl BookingNotifier {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            auth_token: auth_token.map(str::to_string),
            email: EmailClient::new(config),
            sms: SmsClient::new(config),
        }
    }

    pub async fn load_details(&self, booking_id: Uuid) -> Result<BookingDetails, NotificationError> {
        debug!("Loading booking {} for notification", booking_id);

        let path = format!("/rest/v1/bookings?id=eq.{}&select=*,services(name)", booking_id);
        let rows: Vec<BookingRow> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        let row = rows.into_iter().next().ok_or(NotificationError::BookingNotFound)?;
        let provider_name = self.provider_name(row.provider_id).await;

        Ok(BookingDetails::from_row(row, provider_name))
    }

    // Any error falls back to the default provider name.
    async fn provider_name(&self, provider_id: Uuid) -> Option<String> {
        let path = format!("/rest/v1/profiles?id=eq.{}&select=full_name", provider_id);
        let result: anyhow::Result<Vec<ProviderName>> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await;

        match result {
            Ok(rows) => rows.into_iter().next().and_then(|profile| profile.full_name),
            Err(e) => {
                warn!("Could not load provider {} name: {}", provider_id, e);
                None
            }
        }
    }

    pub async fn send_email(&self, details: &BookingDetails) -> Result<String, NotificationError> {
        self.email
            .send(&details.customer_email, EMAIL_SUBJECT, &email_html(details))
            .await
    }

    pub async fn send_sms(&self, details: &BookingDetails) -> Result<String, NotificationError> {
        let phone = details.customer_phone.as_deref().ok_or_else(|| {
            NotificationError::InvalidPhoneNumber("booking has no phone number".to_string())
        })?;

        self.sms.send(phone, &sms_body(details)).await
    }

    async fn email_outcome(&self, details: &BookingDetails) -> DeliveryOutcome {
        if !self.email.is_configured() {
            return DeliveryOutcome::Skipped { reason: "email is not configured".to_string() };
        }

        match self.send_email(details).await {
            Ok(id) => DeliveryOutcome::Sent { id },
            Err(e) => {
                warn!("Email for booking {} failed: {}", details.booking_id, e);
                DeliveryOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    async fn sms_outcome(&self, details: &BookingDetails) -> DeliveryOutcome {
        if details.customer_phone.is_none() {
            return DeliveryOutcome::Skipped { reason: "no phone number".to_string() };
        }
        if !self.sms.is_configured() {
            return DeliveryOutcome::Skipped { reason: "SMS is not configured".to_string() };
        }

        match self.send_sms(details).await {
            Ok(sid) => DeliveryOutcome::Sent { id: sid },
            Err(e) => {
                warn!("SMS for booking {} failed: {}", details.booking_id, e);
                DeliveryOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

#[async_trait]
impl NotificationDispatcher for BookingNotifier {
    async fn dispatch(&self, booking_id: Uuid) -> Result<NotificationReport, NotificationError> {
        let details = self.load_details(booking_id).await?;

        let (email, sms) = futures::join!(
            self.email_outcome(&details),
            self.sms_outcome(&details),
        );

        info!(
            "Notifications for booking {}: email sent={}, sms sent={}",
            booking_id, email.is_sent(), sms.is_sent()
        );

        Ok(NotificationReport { email, sms })
    }
}
