use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProviderError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 30;
pub const DEFAULT_SERVICE_DURATION: i32 = 30;
pub const MAX_SERVICE_DURATION: i32 = 24 * 60;

// ==============================================================================
// PROFILES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.username.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub about: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.full_name.is_none()
            && self.avatar_url.is_none()
            && self.about.is_none()
    }
}

/// Normalizes a requested username to lowercase and checks its shape.
pub fn validate_username(raw: &str) -> Result<String, ProviderError> {
    let username = raw.trim().to_lowercase();

    if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
        return Err(ProviderError::InvalidUsername(format!(
            "must be between {} and {} characters", MIN_USERNAME_LEN, MAX_USERNAME_LEN
        )));
    }

    let allowed = Regex::new(r"^[a-z0-9_-]+$")
        .map(|re| re.is_match(&username))
        .unwrap_or(false);

    if !allowed {
        return Err(ProviderError::InvalidUsername(
            "only lowercase letters, digits, '-' and '_' are allowed".to_string(),
        ));
    }

    Ok(username)
}

// ==============================================================================
// SERVICE CATALOG
// ==============================================================================

/// A bookable offering. `duration` is in minutes and `price` in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub price: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_duration() -> i32 {
    DEFAULT_SERVICE_DURATION
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: i32,
    pub price: i64,
}

impl CreateServiceRequest {
    pub fn validate(&self) -> Result<(), ProviderError> {
        validate_name(&self.name)?;
        validate_duration(self.duration)?;
        validate_price(self.price)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<i64>,
}

impl UpdateServiceRequest {
    pub fn validate(&self) -> Result<(), ProviderError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(duration) = self.duration {
            validate_duration(duration)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ProviderError> {
    if name.trim().is_empty() {
        return Err(ProviderError::Validation("Service name is required".to_string()));
    }
    Ok(())
}

fn validate_duration(duration: i32) -> Result<(), ProviderError> {
    if duration <= 0 || duration > MAX_SERVICE_DURATION {
        return Err(ProviderError::Validation(format!(
            "Duration must be between 1 and {} minutes", MAX_SERVICE_DURATION
        )));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), ProviderError> {
    if price < 0 {
        return Err(ProviderError::Validation("Price cannot be negative".to_string()));
    }
    Ok(())
}
