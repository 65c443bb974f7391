use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::error::NotificationError;

/// Twilio rejects the sender number for this destination.
const TWILIO_UNREACHABLE_DESTINATION: i64 = 21606;

const MIN_E164_DIGITS: usize = 8;
const MAX_E164_DIGITS: usize = 15;

/// Brings a stored phone number into `+<digits>` form.
///
/// Numbers already starting with `+` keep their country code. Ten bare
/// digits are taken as North American and get `+1`.
pub fn normalize_phone_number(raw: &str) -> Result<String, NotificationError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let normalized = if trimmed.starts_with('+') {
        format!("+{}", digits)
    } else if digits.len() == 10 {
        format!("+1{}", digits)
    } else {
        return Err(NotificationError::InvalidPhoneNumber(format!(
            "'{}' must start with + and a country code", raw
        )));
    };

    let count = normalized.len() - 1;
    if !(MIN_E164_DIGITS..=MAX_E164_DIGITS).contains(&count) {
        return Err(NotificationError::InvalidPhoneNumber(format!(
            "'{}' has {} digits", raw, count
        )));
    }

    Ok(normalized)
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<i64>,
    message: Option<String>,
}

fn classify_twilio_error(status: u16, body: &str) -> NotificationError {
    let parsed: Option<TwilioError> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code);
    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    if code == Some(TWILIO_UNREACHABLE_DESTINATION) {
        return NotificationError::SmsNotConfigured(message);
    }

    let lowered = message.to_lowercase();
    if lowered.contains("toll-free") || lowered.contains("verification required") {
        return NotificationError::SmsUnavailable(message);
    }

    NotificationError::Upstream(format!("SMS API returned {}: {}", status, message))
}

/// Sends SMS through the Twilio Messages API.
pub struct SmsClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl SmsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.twilio_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from: config.twilio_phone_number.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from.is_empty()
    }

    /// Returns the message sid.
    pub async fn send(&self, to: &str, body: &str) -> Result<String, NotificationError> {
        if !self.is_configured() {
            return Err(NotificationError::SmsNotConfigured("missing Twilio credentials".to_string()));
        }

        let to = normalize_phone_number(to)?;
        debug!("Sending SMS to {}", to);

        let url = format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        let response = self.client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to.as_str()), ("From", self.from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("SMS API error ({}): {}", status, body);
            return Err(classify_twilio_error(status.as_u16(), &body));
        }

        let message: TwilioMessage = response.json().await?;
        info!("SMS {} sent to {}", message.sid, to);
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_numbers_are_kept_without_punctuation() {
        assert_eq!(normalize_phone_number("+1 (555) 123-4567").unwrap(), "+15551234567");
        assert_eq!(normalize_phone_number("+447700900123").unwrap(), "+447700900123");
    }

    #[test]
    fn test_ten_bare_digits_get_north_american_prefix() {
        assert_eq!(normalize_phone_number("555-123-4567").unwrap(), "+15551234567");
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        assert!(matches!(normalize_phone_number("12345"), Err(NotificationError::InvalidPhoneNumber(_))));
        assert!(matches!(normalize_phone_number(""), Err(NotificationError::InvalidPhoneNumber(_))));
        assert!(matches!(normalize_phone_number("+12"), Err(NotificationError::InvalidPhoneNumber(_))));
    }

    #[test]
    fn test_twilio_error_classification() {
        let unreachable = r#"{"code":21606,"message":"The From phone number is not a valid, SMS-capable number","status":400}"#;
        assert!(matches!(classify_twilio_error(400, unreachable), NotificationError::SmsNotConfigured(_)));

        let toll_free = r#"{"code":30032,"message":"Toll-Free Number Has Not Been Verified","status":400}"#;
        assert!(matches!(classify_twilio_error(400, toll_free), NotificationError::SmsUnavailable(_)));

        let other = r#"{"code":21211,"message":"Invalid 'To' Phone Number","status":400}"#;
        assert!(matches!(classify_twilio_error(400, other), NotificationError::Upstream(_)));

        assert!(matches!(classify_twilio_error(502, "gateway down"), NotificationError::Upstream(_)));
    }
}
