use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{is_conflict, SupabaseClient};

use crate::error::ProviderError;
use crate::models::{validate_username, Profile, UpdateProfileRequest};

pub struct ProfileService {
    supabase: SupabaseClient,
    auth_token: Option<String>,
}

impl ProfileService {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            auth_token: auth_token.map(str::to_string),
        }
    }

    async fn fetch_one(&self, path: &str) -> Result<Option<Profile>, ProviderError> {
        let rows: Vec<Profile> = self.supabase.request(
            Method::GET,
            path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        Ok(rows.into_iter().next())
    }

    pub async fn get_profile(&self, provider_id: Uuid) -> Result<Profile, ProviderError> {
        debug!("Fetching profile {}", provider_id);

        let path = format!("/rest/v1/profiles?id=eq.{}", provider_id);
        self.fetch_one(&path).await?.ok_or(ProviderError::ProfileNotFound)
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<Profile, ProviderError> {
        debug!("Fetching profile by username {}", username);

        let path = format!(
            "/rest/v1/profiles?username=eq.{}",
            urlencoding::encode(&username.to_lowercase())
        );
        self.fetch_one(&path).await?.ok_or(ProviderError::ProfileNotFound)
    }

    pub async fn update_profile(
        &self,
        provider_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Profile, ProviderError> {
        if request.is_empty() {
            return self.get_profile(provider_id).await;
        }

        let mut update = Map::new();

        if let Some(raw) = &request.username {
            let username = validate_username(raw)?;
            self.ensure_username_free(provider_id, &username).await?;
            update.insert("username".to_string(), json!(username));
        }
        if let Some(full_name) = request.full_name {
            update.insert("full_name".to_string(), json!(full_name.trim()));
        }
        if let Some(avatar_url) = request.avatar_url {
            update.insert("avatar_url".to_string(), json!(avatar_url));
        }
        if let Some(about) = request.about {
            update.insert("about".to_string(), json!(about));
        }
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/profiles?id=eq.{}", provider_id);
        let result: anyhow::Result<Vec<Profile>> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            self.auth_token.as_deref(),
            Some(Value::Object(update)),
            Some(SupabaseClient::representation_headers()),
        ).await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) if is_conflict(&e) => return Err(ProviderError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        let profile = rows.into_iter().next().ok_or(ProviderError::ProfileNotFound)?;
        info!("Updated profile {}", provider_id);
        Ok(profile)
    }

    async fn ensure_username_free(&self, provider_id: Uuid, username: &str) -> Result<(), ProviderError> {
        let path = format!(
            "/rest/v1/profiles?username=eq.{}&id=neq.{}&select=id",
            urlencoding::encode(username),
            provider_id
        );
        let taken: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        if !taken.is_empty() {
            warn!("Username {} already taken", username);
            return Err(ProviderError::UsernameTaken);
        }
        Ok(())
    }
}
