use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::AvailabilityError;
use crate::models::{
    AvailabilityPatch, BookedInterval, DayAvailability, SlotRequest, TimeSlot, WeeklyAvailability,
};
use crate::services::resolver::AvailabilityResolver;
use crate::services::store::{AvailabilityStore, SupabaseAvailabilityStore};

pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
    resolver: AvailabilityResolver,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let store = SupabaseAvailabilityStore::new(supabase, auth_token.map(str::to_string));
        Self::with_store(Arc::new(store))
    }

    pub fn with_store(store: Arc<dyn AvailabilityStore>) -> Self {
        Self {
            store,
            resolver: AvailabilityResolver::new(),
        }
    }

    /// The stored schedule, or the default Monday-Friday schedule for a provider
    /// who never saved one.
    pub async fn get_availability(&self, provider_id: Uuid) -> Result<WeeklyAvailability, AvailabilityError> {
        debug!("Fetching availability for provider {}", provider_id);

        let weekly = self.store.load(provider_id).await?
            .unwrap_or_else(|| WeeklyAvailability::default_for(provider_id));

        Ok(weekly)
    }

    pub async fn update_availability(
        &self,
        provider_id: Uuid,
        weekday: u8,
        patch: AvailabilityPatch,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        let current = self.get_availability(provider_id).await?;
        let updated = current.apply_patch(weekday, &patch)?;

        let saved = self.store.save(&updated).await?;
        info!("Updated weekday {} availability for provider {}", weekday, provider_id);

        Ok(saved)
    }

    pub async fn replace_availability(
        &self,
        provider_id: Uuid,
        days: Vec<DayAvailability>,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        let weekly = WeeklyAvailability { provider_id, days, updated_at: None }.sorted();
        weekly.validate()?;

        let saved = self.store.save(&weekly).await?;
        info!("Replaced weekly availability for provider {}", provider_id);

        Ok(saved)
    }

    pub async fn slots_for_date(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        service_duration: i32,
        existing: &[BookedInterval],
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        let weekly = self.get_availability(provider_id).await?;
        self.resolver.slots_for_date(date, &weekly, service_duration, existing, now)
    }

    pub async fn validate_booking(
        &self,
        provider_id: Uuid,
        request: &SlotRequest,
        existing: &[BookedInterval],
        now: DateTime<Utc>,
    ) -> Result<TimeSlot, AvailabilityError> {
        let weekly = self.get_availability(provider_id).await?;
        self.resolver.validate_booking(request, &weekly, existing, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use crate::models::ClockTime;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<WeeklyAvailability>>,
    }

    #[async_trait]
    impl AvailabilityStore for MemoryStore {
        async fn load(&self, _provider_id: Uuid) -> Result<Option<WeeklyAvailability>> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, weekly: &WeeklyAvailability) -> Result<WeeklyAvailability> {
            *self.saved.lock().unwrap() = Some(weekly.clone());
            Ok(weekly.clone())
        }
    }

    #[tokio::test]
    async fn test_unsaved_provider_gets_default_schedule() {
        let service = AvailabilityService::with_store(Arc::new(MemoryStore::default()));
        let provider_id = Uuid::new_v4();

        let weekly = service.get_availability(provider_id).await.unwrap();
        assert_eq!(weekly, WeeklyAvailability::default_for(provider_id));
    }

    #[tokio::test]
    async fn test_update_persists_patched_schedule() {
        let store = Arc::new(MemoryStore::default());
        let service = AvailabilityService::with_store(store.clone());
        let provider_id = Uuid::new_v4();

        let patch = AvailabilityPatch { enabled: Some(true), start: None, end: None };
        service.update_availability(provider_id, 0, patch).await.unwrap();

        let stored = store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(stored.available_weekdays(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_invalid_replacement_is_not_saved() {
        let store = Arc::new(MemoryStore::default());
        let service = AvailabilityService::with_store(store.clone());
        let provider_id = Uuid::new_v4();

        let mut days = WeeklyAvailability::default_for(provider_id).days;
        days[3].end = ClockTime::from_hm(8, 0).unwrap();

        let result = service.replace_availability(provider_id, days).await;
        assert!(matches!(result, Err(AvailabilityError::InvalidAvailabilityConfig(_))));
        assert!(store.saved.lock().unwrap().is_none());
    }
}
