pub mod dispatcher;
pub mod email;
pub mod sms;

pub use dispatcher::{BookingNotifier, NotificationDispatcher};
pub use email::EmailClient;
pub use sms::{normalize_phone_number, SmsClient};
