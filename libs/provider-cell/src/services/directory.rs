use async_trait::async_trait;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::ProviderError;
use crate::models::{Profile, Service};
use crate::services::{CatalogService, ProfileService};

/// Read-only lookups other cells need when acting on a provider's behalf.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn profile_by_username(&self, username: &str) -> Result<Profile, ProviderError>;

    async fn service(&self, service_id: Uuid) -> Result<Service, ProviderError>;
}

pub struct SupabaseProviderDirectory {
    profiles: ProfileService,
    catalog: CatalogService,
}

impl SupabaseProviderDirectory {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        Self {
            profiles: ProfileService::new(config, auth_token),
            catalog: CatalogService::new(config, auth_token),
        }
    }
}

#[async_trait]
impl ProviderDirectory for SupabaseProviderDirectory {
    async fn profile_by_username(&self, username: &str) -> Result<Profile, ProviderError> {
        self.profiles.get_profile_by_username(username).await
    }

    async fn service(&self, service_id: Uuid) -> Result<Service, ProviderError> {
        self.catalog.get_service(service_id).await
    }
}
