use chrono::NaiveDate;

use super::form::Draft;
use crate::core::dates::parse_date;
use crate::core::{Reminder, ReminderFormData, ReminderFrequency};
use crate::error::ValidationError;

pub const REMINDER_CREATED: &str = "Reminder created successfully";
pub const REMINDER_DELETED: &str = "Reminder deleted";
pub const REMINDER_COMPLETED: &str = "Reminder marked as complete";

/// Pending and completed reminders, each in source order. Every reminder
/// lands in exactly one side.
#[derive(Debug, Default)]
pub struct ReminderPartition<'a> {
    pub pending: Vec<&'a Reminder>,
    pub completed: Vec<&'a Reminder>,
}

impl<'a> ReminderPartition<'a> {
    pub fn of(reminders: &'a [Reminder]) -> Self {
        let (completed, pending) = reminders.iter().partition(|r| r.completed);
        Self { pending, completed }
    }
}

/// Whole days from `today` to `due`. Negative when overdue.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

pub fn days_until_label(days: i64) -> String {
    match days {
        d if d < 0 => format!("{} days overdue", d.unsigned_abs()),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d => format!("in {} days", d),
    }
}

pub fn due_label(reminder: &Reminder, today: NaiveDate) -> String {
    days_until_label(days_until(reminder.due_date, today))
}

/// Add Reminder dialog fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDraft {
    pub contact: String,
    pub title: String,
    pub due_date: String,
    pub frequency: ReminderFrequency,
}

impl Draft for ReminderDraft {
    type Payload = ReminderFormData;

    fn validate(&self) -> Result<ReminderFormData, ValidationError> {
        let contact = self.contact.trim();
        let title = self.title.trim();
        let due = self.due_date.trim();
        if contact.is_empty() || title.is_empty() || due.is_empty() {
            return Err(ValidationError::MissingReminderFields);
        }
        let due_date = parse_date(due).ok_or_else(|| ValidationError::InvalidDate(due.to_string()))?;
        Ok(ReminderFormData {
            contact: contact.to_string(),
            title: title.to_string(),
            due_date,
            frequency: self.frequency,
        })
    }
}
