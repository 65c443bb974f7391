pub mod availability;
pub mod resolver;
pub mod store;

pub use availability::AvailabilityService;
pub use resolver::{intervals_overlap, AvailabilityResolver, DEFAULT_GRANULARITY_MINUTES, MAX_GRANULARITY_MINUTES};
pub use store::{AvailabilityStore, SupabaseAvailabilityStore};
