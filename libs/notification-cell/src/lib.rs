pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod templates;

pub use error::NotificationError;
pub use models::*;
pub use services::*;
