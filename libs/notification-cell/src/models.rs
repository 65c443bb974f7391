use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PROVIDER_NAME: &str = "Our Team";
pub const DEFAULT_SERVICE_NAME: &str = "Service";

/// Booking row as read for a confirmation, with the service name embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRow {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub booking_datetime: DateTime<Utc>,
    pub duration: i32,
    pub price: i64,
    #[serde(default)]
    pub services: Option<ServiceName>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceName {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderName {
    pub full_name: Option<String>,
}

/// Everything a confirmation message says about a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub service_name: String,
    pub provider_name: String,
    pub booking_datetime: DateTime<Utc>,
    pub duration_minutes: i32,
    pub price: i64,
}

impl BookingDetails {
    pub fn from_row(row: BookingRow, provider_name: Option<String>) -> Self {
        let service_name = row.services
            .and_then(|service| service.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let provider_name = provider_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string());

        Self {
            booking_id: row.id,
            provider_id: row.provider_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.phone_number.filter(|phone| !phone.trim().is_empty()),
            service_name,
            provider_name,
            booking_datetime: row.booking_datetime,
            duration_minutes: row.duration,
            price: row.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent { id: String },
    Skipped { reason: String },
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReport {
    pub email: DeliveryOutcome,
    pub sms: DeliveryOutcome,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    pub booking_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(service: serde_json::Value, phone: serde_json::Value) -> BookingRow {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "provider_id": Uuid::new_v4(),
            "customer_name": "Jane Customer",
            "customer_email": "jane@example.com",
            "phone_number": phone,
            "booking_datetime": "2030-01-07T10:00:00Z",
            "duration": 60,
            "price": 5000,
            "services": service,
            "status": "pending"
        })).unwrap()
    }

    #[test]
    fn test_missing_names_fall_back() {
        let details = BookingDetails::from_row(row(json!(null), json!(null)), None);
        assert_eq!(details.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(details.provider_name, DEFAULT_PROVIDER_NAME);
        assert_eq!(details.customer_phone, None);
    }

    #[test]
    fn test_embedded_service_name_is_used() {
        let details = BookingDetails::from_row(
            row(json!({ "name": "Deep Tissue Massage" }), json!("")),
            Some("Dr. Jane".to_string()),
        );
        assert_eq!(details.service_name, "Deep Tissue Massage");
        assert_eq!(details.provider_name, "Dr. Jane");
        assert_eq!(details.customer_phone, None);
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = DeliveryOutcome::Skipped { reason: "no phone number".to_string() };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "outcome": "skipped", "reason": "no phone number" })
        );
    }
}
