pub mod cache;
pub mod contacts;
pub mod dashboard;
pub mod keys;
pub mod reminders;

pub use cache::{CacheEvent, Freshness, QueryClient, Subscription};
pub use contacts::ContactQueries;
pub use dashboard::DashboardQueries;
pub use keys::QueryKey;
pub use reminders::ReminderQueries;
