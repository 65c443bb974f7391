use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ProviderError;
use crate::models::{CreateServiceRequest, Service, UpdateServiceRequest};

/// Service catalog CRUD. Bookings copy duration and price when created, so
/// edits here never reach existing bookings.
pub struct CatalogService {
    supabase: SupabaseClient,
    auth_token: Option<String>,
}

impl CatalogService {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            auth_token: auth_token.map(str::to_string),
        }
    }

    pub async fn list_services(&self, provider_id: Uuid) -> Result<Vec<Service>, ProviderError> {
        debug!("Listing services for provider {}", provider_id);

        let path = format!("/rest/v1/services?user_id=eq.{}&order=name.asc", provider_id);
        let services: Vec<Service> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        Ok(services)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<Service, ProviderError> {
        debug!("Fetching service {}", service_id);

        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let services: Vec<Service> = self.supabase.request(
            Method::GET,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        services.into_iter().next().ok_or(ProviderError::ServiceNotFound)
    }

    pub async fn create_service(
        &self,
        provider_id: Uuid,
        request: CreateServiceRequest,
    ) -> Result<Service, ProviderError> {
        request.validate()?;

        let now = Utc::now().to_rfc3339();
        let body = json!({
            "user_id": provider_id,
            "name": request.name.trim(),
            "description": request.description,
            "duration": request.duration,
            "price": request.price,
            "created_at": now,
            "updated_at": now,
        });

        let rows: Vec<Service> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/services",
            self.auth_token.as_deref(),
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let service = rows.into_iter().next()
            .ok_or_else(|| ProviderError::Database("Insert returned no rows".to_string()))?;

        info!("Created service {} for provider {}", service.id, provider_id);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        provider_id: Uuid,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, ProviderError> {
        request.validate()?;
        let existing = self.owned_service(provider_id, service_id).await?;

        let mut update = Map::new();
        if let Some(name) = request.name {
            update.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(description) = request.description {
            update.insert("description".to_string(), json!(description));
        }
        if let Some(duration) = request.duration {
            update.insert("duration".to_string(), json!(duration));
        }
        if let Some(price) = request.price {
            update.insert("price".to_string(), json!(price));
        }

        if update.is_empty() {
            return Ok(existing);
        }
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/services?id=eq.{}&user_id=eq.{}", service_id, provider_id);
        let rows: Vec<Service> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            self.auth_token.as_deref(),
            Some(Value::Object(update)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let service = rows.into_iter().next().ok_or(ProviderError::ServiceNotFound)?;
        info!("Updated service {}", service_id);
        Ok(service)
    }

    pub async fn delete_service(&self, provider_id: Uuid, service_id: Uuid) -> Result<(), ProviderError> {
        self.owned_service(provider_id, service_id).await?;

        let path = format!("/rest/v1/services?id=eq.{}&user_id=eq.{}", service_id, provider_id);
        let _: Vec<Value> = self.supabase.request(
            Method::DELETE,
            &path,
            self.auth_token.as_deref(),
            None,
        ).await?;

        info!("Deleted service {}", service_id);
        Ok(())
    }

    async fn owned_service(&self, provider_id: Uuid, service_id: Uuid) -> Result<Service, ProviderError> {
        let service = self.get_service(service_id).await?;
        if service.user_id != provider_id {
            return Err(ProviderError::NotOwner);
        }
        Ok(service)
    }
}
