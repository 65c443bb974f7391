use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::WeeklyAvailability;

/// Provider-scoped persistence for weekly schedules, one row per provider.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn load(&self, provider_id: Uuid) -> Result<Option<WeeklyAvailability>>;

    async fn save(&self, weekly: &WeeklyAvailability) -> Result<WeeklyAvailability>;
}

pub struct SupabaseAvailabilityStore {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseAvailabilityStore {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }
}

#[async_trait]
impl AvailabilityStore for SupabaseAvailabilityStore {
    async fn load(&self, provider_id: Uuid) -> Result<Option<WeeklyAvailability>> {
        debug!("Loading availability for provider {}", provider_id);

        let path = format!("/rest/v1/availability?provider_id=eq.{}&limit=1", provider_id);
        let rows: Vec<WeeklyAvailability> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        Ok(rows.into_iter().next().map(WeeklyAvailability::sorted))
    }

    async fn save(&self, weekly: &WeeklyAvailability) -> Result<WeeklyAvailability> {
        debug!("Saving availability for provider {}", weekly.provider_id);

        let body = json!({
            "provider_id": weekly.provider_id,
            "days": weekly.days,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/availability?on_conflict=provider_id",
            self.auth_token.as_deref(),
            Some(body),
            Some(SupabaseClient::upsert_headers()),
        ).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(serde_json::from_value::<WeeklyAvailability>(row)?.sorted()),
            None => Ok(weekly.clone()),
        }
    }
}
