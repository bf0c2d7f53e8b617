pub mod contact;
pub mod dashboard;
pub mod dates;
pub mod reminder;

pub use contact::{Contact, ContactFormData, ContactPatch, ContactType};
pub use dashboard::{ActionMessage, DashboardStats};
pub use reminder::{Reminder, ReminderFormData, ReminderFrequency, ReminderPatch};
