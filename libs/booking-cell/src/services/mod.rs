pub mod booking;
pub mod lifecycle;
pub mod metrics;
pub mod store;

pub use booking::BookingService;
pub use lifecycle::BookingLifecycleService;
pub use metrics::compute_metrics;
pub use store::{BookingStore, SupabaseBookingStore};
