use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub resend_base_url: String,
    pub twilio_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            resend_base_url: "http://localhost:54322".to_string(),
            twilio_base_url: "http://localhost:54323".to_string(),
        }
    }
}

impl TestConfig {
    /// Points every upstream (Supabase, Resend, Twilio) at one mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            resend_base_url: uri.to_string(),
            twilio_base_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            supabase_service_role_key: None,
            resend_api_key: "re_test_key".to_string(),
            resend_base_url: self.resend_base_url.clone(),
            email_from: "Booking Confirmation <bookings@resend.dev>".to_string(),
            twilio_account_sid: "ACtest".to_string(),
            twilio_auth_token: "twilio-test-token".to_string(),
            twilio_phone_number: "+15550000000".to_string(),
            twilio_base_url: self.twilio_base_url.clone(),
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "authenticated".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn provider(email: &str) -> Self {
        Self::new(email, "authenticated")
    }

    pub fn anonymous() -> Self {
        Self::new("", "anon")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "aud": "authenticated",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes as PostgREST returns them for the booking dashboard tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn profile_response(user_id: &str, username: &str, full_name: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "email": format!("{}@example.com", username),
            "username": username,
            "full_name": full_name,
            "avatar_url": null,
            "about": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn service_response(service_id: &str, provider_id: &str, name: &str, duration: i32, price: i64) -> serde_json::Value {
        json!({
            "id": service_id,
            "user_id": provider_id,
            "name": name,
            "description": null,
            "duration": duration,
            "price": price,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    /// Monday to Friday, 09:00-17:00.
    pub fn availability_response(provider_id: &str) -> serde_json::Value {
        let days: Vec<serde_json::Value> = (0..7)
            .map(|weekday| json!({
                "weekday": weekday,
                "enabled": (1..=5).contains(&weekday),
                "start": "09:00",
                "end": "17:00"
            }))
            .collect();

        json!({
            "provider_id": provider_id,
            "days": days,
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn booking_response(
        booking_id: &str,
        provider_id: &str,
        service_id: &str,
        booking_datetime: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": booking_id,
            "created_at": "2024-01-01T00:00:00Z",
            "provider_id": provider_id,
            "service_id": service_id,
            "customer_name": "Jane Customer",
            "customer_email": "jane@example.com",
            "phone_number": "+15551234567",
            "booking_datetime": booking_datetime,
            "notes": null,
            "status": status,
            "duration": 60,
            "price": 5000
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_mock_server("http://127.0.0.1:9999");
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(app_config.resend_base_url, "http://127.0.0.1:9999");
        assert!(app_config.is_configured());
        assert!(app_config.is_email_configured());
        assert!(app_config.is_sms_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::provider("owner@example.com");
        let user_model = user.to_user();

        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.id, user.id);
        assert!(!user_model.is_anonymous());
        assert!(TestUser::anonymous().to_user().is_anonymous());
    }

    #[test]
    fn test_availability_fixture_has_every_weekday() {
        let fixture = MockSupabaseResponses::availability_response("p1");
        let days = fixture["days"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0]["enabled"], false);
        assert_eq!(days[1]["enabled"], true);
    }
}
